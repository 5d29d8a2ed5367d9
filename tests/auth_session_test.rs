// ==========================================
// 会话集成测试
// ==========================================
// 测试范围:
// 1. 三个角色的口令
// 2. 失败登录不写入
// 3. 会话跨进程恢复（重开数据库）
// ==========================================

mod helpers;

use helpers::api_test_helper::*;

use extrusion_erp::api::SESSION_KEY;
use extrusion_erp::app::AppState;
use extrusion_erp::{SessionContext, UserRole};

#[test]
fn test_login_each_role() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    for (role, secret) in [
        (UserRole::Operational, "123"),
        (UserRole::Control, "321"),
        (UserRole::Maintenance, "789"),
    ] {
        let ctx = env.auth_api.login(role, secret).expect("登录失败");
        assert_eq!(ctx.role, role);
        let stored = env.store.local_storage.get(SESSION_KEY).unwrap().unwrap();
        assert_eq!(stored, format!(r#"{{"role":"{}"}}"#, role.as_str()));
    }
}

#[test]
fn test_failed_login_keeps_existing_session() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.auth_api.login(UserRole::Maintenance, "789").unwrap();

    let err = env.auth_api.login(UserRole::Control, "123").unwrap_err();
    assert_eq!(err.code(), "INVALID_CREDENTIALS");
    assert!(err.is_user_correctable());

    // 可重试，无锁定
    for _ in 0..5 {
        assert!(env.auth_api.login(UserRole::Control, "000").is_err());
    }
    assert_eq!(
        env.auth_api.restore_session().unwrap(),
        Some(SessionContext::new(UserRole::Maintenance))
    );
    assert!(env.auth_api.login(UserRole::Control, "321").is_ok());
}

#[test]
fn test_session_survives_reopen() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.auth_api.login(UserRole::Operational, "123").unwrap();

    let reopened = AppState::new(env.db_path.clone()).expect("重新打开失败");
    let ctx = reopened.auth_api.restore_session().unwrap().expect("会话应已保存");
    assert_eq!(ctx.role, UserRole::Operational);

    reopened.auth_api.logout().unwrap();
    assert_eq!(env.auth_api.restore_session().unwrap(), None);
    // 重复注销不报错
    assert!(env.auth_api.logout().is_ok());
}
