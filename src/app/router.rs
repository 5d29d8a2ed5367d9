// ==========================================
// 挤出线车间管理系统 - 页面路由
// ==========================================
// 职责: 按会话角色解析页面、生成菜单、决定生产页的展示模式
// 权限来源: domain::access 静态能力表
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::guard::require_view;
use crate::domain::access::{permitted_screens, Action, Screen, SessionContext};
use crate::domain::types::UserRole;
use crate::i18n::t;
use crate::repository::RecordStore;

/// 生产页展示模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionMode {
    /// 操作工 + 有激活订单: 仅显示当前订单与四类登记
    ActiveOrderOnly,
    /// 操作工 + 无激活订单: 订单列表，可激活
    AwaitingActivation,
    /// 生产控制: 完整订单管理
    FullManagement,
}

impl ProductionMode {
    pub fn label_key(&self) -> &'static str {
        match self {
            ProductionMode::ActiveOrderOnly => "production_mode.active_order_only",
            ProductionMode::AwaitingActivation => "production_mode.awaiting_activation",
            ProductionMode::FullManagement => "production_mode.full_management",
        }
    }

    /// 该模式下界面提供的操作
    pub fn actions(&self) -> &'static [Action] {
        match self {
            ProductionMode::ActiveOrderOnly => &[
                Action::LogStop,
                Action::LogProduction,
                Action::LogConsumption,
                Action::LogWaste,
            ],
            ProductionMode::AwaitingActivation => &[Action::ActivateOrder],
            ProductionMode::FullManagement => &[
                Action::CreateOrder,
                Action::EditOrder,
                Action::ActivateOrder,
            ],
        }
    }
}

/// 菜单项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub screen: Screen,
    pub label: String,
}

pub struct ViewRouter {
    store: Arc<RecordStore>,
}

impl ViewRouter {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// 解析目标页面（未指定时进入驾驶舱）
    pub fn resolve(&self, ctx: &SessionContext, requested: Option<Screen>) -> ApiResult<Screen> {
        let screen = requested.unwrap_or(Screen::Dashboard);
        require_view(ctx, &[screen])?;
        tracing::debug!(role = ctx.role.as_str(), screen = screen.as_str(), "页面已解析");
        Ok(screen)
    }

    /// 按页面标识解析（未知标识视为输入错误）
    pub fn resolve_path(&self, ctx: &SessionContext, path: &str) -> ApiResult<Screen> {
        let path = path.trim().trim_start_matches('/');
        if path.is_empty() {
            return self.resolve(ctx, None);
        }
        let screen = Screen::ALL
            .iter()
            .copied()
            .find(|s| s.as_str() == path)
            .ok_or_else(|| ApiError::InvalidInput(format!("未知页面: {}", path)))?;
        self.resolve(ctx, Some(screen))
    }

    /// 导航菜单（当前语言）
    pub fn menu(&self, ctx: &SessionContext) -> Vec<MenuEntry> {
        permitted_screens(ctx.role)
            .iter()
            .map(|screen| MenuEntry {
                screen: *screen,
                label: t(screen.label_key()),
            })
            .collect()
    }

    /// 生产页展示模式
    pub fn production_mode(&self, ctx: &SessionContext) -> ApiResult<ProductionMode> {
        require_view(ctx, &[Screen::Production])?;
        match ctx.role {
            UserRole::Operational => {
                if self.store.orders.find_active()?.is_some() {
                    Ok(ProductionMode::ActiveOrderOnly)
                } else {
                    Ok(ProductionMode::AwaitingActivation)
                }
            }
            _ => Ok(ProductionMode::FullManagement),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::domain::production::{OrderInput, ProductionOrder};
    use crate::i18n::tests::LOCALE_TEST_LOCK;
    use std::sync::Mutex;

    fn router() -> (ViewRouter, Arc<RecordStore>) {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        let store = Arc::new(RecordStore::new(conn));
        (ViewRouter::new(store.clone()), store)
    }

    #[test]
    fn test_maintenance_cannot_open_production() {
        let (router, _) = router();
        let ctx = SessionContext::new(UserRole::Maintenance);
        assert_eq!(router.resolve(&ctx, None).unwrap(), Screen::Dashboard);
        assert!(matches!(
            router.resolve(&ctx, Some(Screen::Production)),
            Err(ApiError::Forbidden { .. })
        ));
        assert_eq!(router.resolve_path(&ctx, "/maintenance").unwrap(), Screen::Maintenance);
        assert!(matches!(
            router.resolve_path(&ctx, "/settings"),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_operational_mode_follows_active_order() {
        let (router, store) = router();
        let ctx = SessionContext::new(UserRole::Operational);
        assert_eq!(
            router.production_mode(&ctx).unwrap(),
            ProductionMode::AwaitingActivation
        );

        let id = store
            .orders
            .insert(&ProductionOrder::from_input(&OrderInput::default()))
            .unwrap();
        store.orders.activate(id, chrono::NaiveDateTime::default()).unwrap();
        assert_eq!(router.production_mode(&ctx).unwrap(), ProductionMode::ActiveOrderOnly);

        let control = SessionContext::new(UserRole::Control);
        assert_eq!(
            router.production_mode(&control).unwrap(),
            ProductionMode::FullManagement
        );
    }

    #[test]
    fn test_menu_labels_localized() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        let (router, _) = router();
        let previous = crate::i18n::current_locale();

        crate::i18n::set_locale("pt-BR");
        let menu = router.menu(&SessionContext::new(UserRole::Operational));
        assert_eq!(menu.len(), 2);
        assert_eq!(menu[1].screen, Screen::Production);
        assert_eq!(menu[1].label, "Produção");

        crate::i18n::set_locale(&previous);
    }
}
