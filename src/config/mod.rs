// ==========================================
// 挤出线车间管理系统 - 配置层
// ==========================================
// 职责: 导出/界面/现场表单配置
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, defaults, ConfigManager};
