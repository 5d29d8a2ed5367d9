// ==========================================
// 挤出线车间管理系统 - API 层
// ==========================================
// 职责: 面向界面的业务 API，统一权限校验与错误码
// 约定: 受控调用显式接收 SessionContext
// ==========================================

pub mod auth_api;
pub mod dashboard_api;
pub mod error;
pub mod guard;
pub mod maintenance_api;
pub mod production_api;
pub mod report_api;

// 重导出核心类型
pub use auth_api::{AuthApi, SESSION_KEY};
pub use dashboard_api::{DashboardApi, DashboardSnapshot};
pub use error::{ApiError, ApiResult};
pub use maintenance_api::MaintenanceApi;
pub use production_api::{OrderRecords, ProductionApi};
pub use report_api::{PcpRow, ReportApi};
