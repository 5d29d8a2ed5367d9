// ==========================================
// 挤出线车间管理系统 - 角色权限表
// ==========================================
// 静态能力表: 角色 → 可访问页面 / 可执行操作
// 会话上下文显式传递给每个受控调用（无全局会话）
// ==========================================

use crate::domain::types::UserRole;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Screen - 页面
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Dashboard,   // 驾驶舱（当日产量/OEE）
    Production,  // 生产订单
    Pcp,         // PCP 报表
    Maintenance, // 维护日志
}

impl Screen {
    /// 菜单顺序
    pub const ALL: [Screen; 4] = [
        Screen::Dashboard,
        Screen::Production,
        Screen::Pcp,
        Screen::Maintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Dashboard => "dashboard",
            Screen::Production => "production",
            Screen::Pcp => "pcp",
            Screen::Maintenance => "maintenance",
        }
    }

    /// i18n 键
    pub fn label_key(&self) -> &'static str {
        match self {
            Screen::Dashboard => "screen.dashboard",
            Screen::Production => "screen.production",
            Screen::Pcp => "screen.pcp",
            Screen::Maintenance => "screen.maintenance",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Action - 受控操作
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateOrder,
    EditOrder,
    ActivateOrder,
    LogStop,
    LogProduction,
    LogConsumption,
    LogWaste,
    ExportReport,
    ManageMaintenance,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateOrder => "create_order",
            Action::EditOrder => "edit_order",
            Action::ActivateOrder => "activate_order",
            Action::LogStop => "log_stop",
            Action::LogProduction => "log_production",
            Action::LogConsumption => "log_consumption",
            Action::LogWaste => "log_waste",
            Action::ExportReport => "export_report",
            Action::ManageMaintenance => "manage_maintenance",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 能力表
// ==========================================

const OPERATIONAL_SCREENS: &[Screen] = &[Screen::Dashboard, Screen::Production];
const CONTROL_SCREENS: &[Screen] = &[
    Screen::Dashboard,
    Screen::Production,
    Screen::Pcp,
    Screen::Maintenance,
];
const MAINTENANCE_SCREENS: &[Screen] = &[Screen::Dashboard, Screen::Maintenance];

// 操作工: 在订单列表中激活订单 + 当前订单的四类登记
const OPERATIONAL_ACTIONS: &[Action] = &[
    Action::ActivateOrder,
    Action::LogStop,
    Action::LogProduction,
    Action::LogConsumption,
    Action::LogWaste,
];
const CONTROL_ACTIONS: &[Action] = &[
    Action::CreateOrder,
    Action::EditOrder,
    Action::ActivateOrder,
    Action::ExportReport,
    Action::ManageMaintenance,
];
const MAINTENANCE_ACTIONS: &[Action] = &[Action::ManageMaintenance];

/// 角色可访问的页面（菜单顺序）
pub fn permitted_screens(role: UserRole) -> &'static [Screen] {
    match role {
        UserRole::Operational => OPERATIONAL_SCREENS,
        UserRole::Control => CONTROL_SCREENS,
        UserRole::Maintenance => MAINTENANCE_SCREENS,
    }
}

/// 角色可执行的操作
pub fn permitted_actions(role: UserRole) -> &'static [Action] {
    match role {
        UserRole::Operational => OPERATIONAL_ACTIONS,
        UserRole::Control => CONTROL_ACTIONS,
        UserRole::Maintenance => MAINTENANCE_ACTIONS,
    }
}

// ==========================================
// SessionContext - 会话上下文
// ==========================================
// 持久化格式: {"role":"<role>"}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub role: UserRole,
}

impl SessionContext {
    pub fn new(role: UserRole) -> Self {
        Self { role }
    }

    pub fn can_view(&self, screen: Screen) -> bool {
        permitted_screens(self.role).contains(&screen)
    }

    pub fn can(&self, action: Action) -> bool {
        permitted_actions(self.role).contains(&action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_visible_to_all_roles() {
        for role in UserRole::ALL {
            assert!(SessionContext::new(role).can_view(Screen::Dashboard));
        }
    }

    #[test]
    fn test_screen_table() {
        let op = SessionContext::new(UserRole::Operational);
        let ctl = SessionContext::new(UserRole::Control);
        let mnt = SessionContext::new(UserRole::Maintenance);

        assert!(op.can_view(Screen::Production));
        assert!(!op.can_view(Screen::Pcp));
        assert!(!op.can_view(Screen::Maintenance));

        assert!(ctl.can_view(Screen::Pcp));
        assert!(ctl.can_view(Screen::Maintenance));

        assert!(!mnt.can_view(Screen::Production));
        assert!(!mnt.can_view(Screen::Pcp));
        assert!(mnt.can_view(Screen::Maintenance));
    }

    #[test]
    fn test_action_table() {
        let op = SessionContext::new(UserRole::Operational);
        assert!(op.can(Action::LogStop));
        assert!(op.can(Action::ActivateOrder));
        assert!(!op.can(Action::CreateOrder));
        assert!(!op.can(Action::EditOrder));

        let ctl = SessionContext::new(UserRole::Control);
        assert!(ctl.can(Action::CreateOrder));
        assert!(!ctl.can(Action::LogProduction));

        let mnt = SessionContext::new(UserRole::Maintenance);
        assert_eq!(permitted_actions(mnt.role), &[Action::ManageMaintenance]);
    }

    #[test]
    fn test_session_json_layout() {
        let ctx = SessionContext::new(UserRole::Operational);
        assert_eq!(serde_json::to_string(&ctx).unwrap(), r#"{"role":"operacional"}"#);
    }
}
