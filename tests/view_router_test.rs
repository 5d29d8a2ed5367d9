// ==========================================
// 页面路由集成测试
// ==========================================
// 测试范围:
// 1. 角色 × 页面 能力表
// 2. 生产页展示模式
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use helpers::test_data_builder::OrderBuilder;

use extrusion_erp::app::ProductionMode;
use extrusion_erp::{Action, Screen, SessionContext, UserRole};

#[test]
fn test_screen_matrix() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let expected = [
        (UserRole::Operational, [true, true, false, false]),
        (UserRole::Control, [true, true, true, true]),
        (UserRole::Maintenance, [true, false, false, true]),
    ];

    for (role, allowed) in expected {
        let ctx = SessionContext::new(role);
        for (screen, ok) in Screen::ALL.iter().zip(allowed) {
            assert_eq!(
                env.router.resolve(&ctx, Some(*screen)).is_ok(),
                ok,
                "role={} screen={}",
                role,
                screen
            );
        }
        let menu: Vec<Screen> = env.router.menu(&ctx).into_iter().map(|m| m.screen).collect();
        let visible: Vec<Screen> = Screen::ALL
            .iter()
            .zip(allowed)
            .filter(|(_, ok)| *ok)
            .map(|(s, _)| *s)
            .collect();
        assert_eq!(menu, visible);
    }
}

#[test]
fn test_action_matrix() {
    let op = SessionContext::new(UserRole::Operational);
    let control = SessionContext::new(UserRole::Control);
    let mnt = SessionContext::new(UserRole::Maintenance);

    assert!(op.can(Action::ActivateOrder));
    assert!(op.can(Action::LogWaste));
    assert!(!op.can(Action::CreateOrder));
    assert!(!op.can(Action::ExportReport));

    assert!(control.can(Action::CreateOrder));
    assert!(control.can(Action::ManageMaintenance));
    assert!(!control.can(Action::LogProduction));

    assert!(mnt.can(Action::ManageMaintenance));
    assert!(!mnt.can(Action::ActivateOrder));
}

#[test]
fn test_production_mode_transitions() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let op = env.operator();

    assert_eq!(
        env.router.production_mode(&op).unwrap(),
        ProductionMode::AwaitingActivation
    );
    assert_eq!(
        ProductionMode::AwaitingActivation.actions(),
        &[Action::ActivateOrder]
    );

    let id = env.create_order_id(&OrderBuilder::new("OP-1").build());
    env.production_api.activate_order(&op, id, at(20, 6, 0)).unwrap();

    let mode = env.router.production_mode(&op).unwrap();
    assert_eq!(mode, ProductionMode::ActiveOrderOnly);
    assert_eq!(mode.actions().len(), 4);

    assert_eq!(
        env.router.production_mode(&env.control()).unwrap(),
        ProductionMode::FullManagement
    );
    assert!(env.router.production_mode(&env.maintenance()).is_err());
}
