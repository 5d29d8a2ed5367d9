// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、固定时间点
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use std::error::Error;
use tempfile::NamedTempFile;

use extrusion_erp::db::open_and_migrate;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    open_and_migrate(&db_path)?;

    Ok((temp_file, db_path))
}

/// 测试基准日的时刻
pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 9, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("无效的测试时间")
}
