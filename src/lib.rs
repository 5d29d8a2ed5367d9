// ==========================================
// 挤出线车间管理系统 - 核心库
// ==========================================
// 职责: 生产订单 / 停机 / 物料消耗 / 废料 / 维护 / OEE / PCP 报表
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体、类型、权限表
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 指标聚合、报表渲染、变更事件
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/建表）
pub mod db;

// 日志系统
pub mod logging;

// SQL 性能统计
pub mod perf;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配与页面路由
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    InterventionStatus, MaintenanceType, OrderStatus, StopCategory, UserRole,
};

// 领域实体
pub use domain::{
    Action, MachineStop, MaintenanceIntervention, MaintenancePart, MaterialConsumption,
    PreventivePlanItem, ProductionOrder, Screen, SessionContext, WasteLog,
};

// 引擎
pub use engine::{compute_metrics, DailyMetrics, StoreEvent, StoreEventPublisher, TimeWindow};

// API
pub use api::{
    ApiError, ApiResult, AuthApi, DashboardApi, MaintenanceApi, ProductionApi, ReportApi,
};

// 应用
pub use app::{AppState, ViewRouter};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "挤出线车间管理系统";
