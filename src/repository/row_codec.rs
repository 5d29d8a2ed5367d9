// ==========================================
// 行映射辅助: 枚举列解码
// ==========================================

use rusqlite::types::Type;

/// 解码枚举列；未知值转为 FromSqlConversionFailure
pub(crate) fn decode_enum<T>(
    idx: usize,
    raw: &str,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("未知枚举值: {}", raw).into(),
        )
    })
}
