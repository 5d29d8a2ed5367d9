// ==========================================
// 挤出线车间管理系统 - 会话 API
// ==========================================
// 登录: 角色 + 固定口令（编译期常量，无锁定、无过期）
// 会话: local_storage["erp-user"] = {"role":"<role>"}
// ==========================================

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::access::SessionContext;
use crate::domain::types::UserRole;
use crate::i18n::t;
use crate::repository::LocalStorageRepository;

/// 会话存储键
pub const SESSION_KEY: &str = "erp-user";

/// 角色口令
pub fn credential_for(role: UserRole) -> &'static str {
    match role {
        UserRole::Operational => "123",
        UserRole::Control => "321",
        UserRole::Maintenance => "789",
    }
}

pub struct AuthApi {
    storage: Arc<LocalStorageRepository>,
}

impl AuthApi {
    pub fn new(storage: Arc<LocalStorageRepository>) -> Self {
        Self { storage }
    }

    /// 登录（口令错误时不写入任何数据）
    pub fn login(&self, role: UserRole, secret: &str) -> ApiResult<SessionContext> {
        if secret != credential_for(role) {
            warn!(role = role.as_str(), "登录失败: 口令错误");
            return Err(ApiError::InvalidCredentials(t("auth.invalid_password")));
        }

        let ctx = SessionContext::new(role);
        let value = serde_json::to_string(&ctx)
            .map_err(|e| ApiError::InternalError(format!("会话序列化失败: {}", e)))?;
        self.storage.set(SESSION_KEY, &value)?;

        info!(role = role.as_str(), "登录成功");
        Ok(ctx)
    }

    /// 注销（删除会话记录）
    pub fn logout(&self) -> ApiResult<()> {
        self.storage.remove(SESSION_KEY)?;
        info!("{}", t("auth.logged_out"));
        Ok(())
    }

    /// 恢复会话（记录缺失或格式错误视为未登录）
    pub fn restore_session(&self) -> ApiResult<Option<SessionContext>> {
        let Some(raw) = self.storage.get(SESSION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<SessionContext>(&raw) {
            Ok(ctx) => {
                info!(role = ctx.role.as_str(), "会话已恢复");
                Ok(Some(ctx))
            }
            Err(e) => {
                warn!(error = %e, raw = %raw, "会话记录格式错误，视为未登录");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use std::sync::Mutex;

    fn setup() -> (AuthApi, Arc<LocalStorageRepository>) {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        let storage = Arc::new(LocalStorageRepository::new(conn));
        (AuthApi::new(storage.clone()), storage)
    }

    #[test]
    fn test_login_persists_role() {
        let (api, storage) = setup();
        let ctx = api.login(UserRole::Operational, "123").unwrap();
        assert_eq!(ctx.role, UserRole::Operational);
        assert_eq!(
            storage.get(SESSION_KEY).unwrap().as_deref(),
            Some(r#"{"role":"operacional"}"#)
        );
    }

    #[test]
    fn test_wrong_secret_writes_nothing() {
        let (api, storage) = setup();
        let err = api.login(UserRole::Operational, "wrong").unwrap_err();
        assert_eq!(err.code(), "INVALID_CREDENTIALS");
        // 其他角色的口令也不通用
        assert!(api.login(UserRole::Maintenance, "321").is_err());
        assert_eq!(storage.get(SESSION_KEY).unwrap(), None);
    }

    #[test]
    fn test_restore_and_logout() {
        let (api, storage) = setup();
        assert_eq!(api.restore_session().unwrap(), None);

        api.login(UserRole::Control, "321").unwrap();
        assert_eq!(
            api.restore_session().unwrap(),
            Some(SessionContext::new(UserRole::Control))
        );

        api.logout().unwrap();
        assert_eq!(api.restore_session().unwrap(), None);

        storage.set(SESSION_KEY, "{not json").unwrap();
        assert_eq!(api.restore_session().unwrap(), None);
        storage.set(SESSION_KEY, r#"{"role":"admin"}"#).unwrap();
        assert_eq!(api.restore_session().unwrap(), None);
    }
}
