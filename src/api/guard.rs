// ==========================================
// 挤出线车间管理系统 - API 权限校验
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::access::{Action, Screen, SessionContext};

/// 校验会话能否执行操作
pub fn require(ctx: &SessionContext, action: Action) -> ApiResult<()> {
    if ctx.can(action) {
        return Ok(());
    }
    tracing::warn!(role = ctx.role.as_str(), action = action.as_str(), "操作被拒绝");
    Err(ApiError::Forbidden {
        role: ctx.role,
        target: action.as_str().to_string(),
    })
}

/// 校验会话能否查看任一页面
pub fn require_view(ctx: &SessionContext, screens: &[Screen]) -> ApiResult<()> {
    if screens.iter().any(|s| ctx.can_view(*s)) {
        return Ok(());
    }
    let target = screens
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join("|");
    tracing::warn!(role = ctx.role.as_str(), screens = %target, "页面访问被拒绝");
    Err(ApiError::Forbidden {
        role: ctx.role,
        target,
    })
}

/// 非空文本字段校验（返回去除首尾空白的值）
pub(crate) fn require_text(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", field)));
    }
    Ok(trimmed.to_string())
}

/// 数量字段校验: 有限且 >= 0
pub(crate) fn require_non_negative(field: &str, value: f64) -> ApiResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::InvalidInput(format!(
            "{}必须为非负数: {}",
            field, value
        )));
    }
    Ok(value)
}
