// ==========================================
// 挤出线车间管理系统 - 应用层
// ==========================================
// 职责: 装配共享状态，页面路由
// ==========================================

pub mod router;
pub mod state;

// 重导出
pub use router::{MenuEntry, ProductionMode, ViewRouter};
pub use state::{get_default_db_path, AppState, ENV_DB_PATH};
