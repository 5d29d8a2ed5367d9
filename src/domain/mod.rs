// ==========================================
// 挤出线车间管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、权限表
// 红线: 不含数据访问逻辑
// ==========================================

pub mod access;
pub mod maintenance;
pub mod production;
pub mod types;

// 重导出核心类型
pub use access::{permitted_actions, permitted_screens, Action, Screen, SessionContext};
pub use maintenance::{
    InterventionInput, MaintenanceIntervention, MaintenancePart, PreventivePlanItem,
};
pub use production::{
    ConsumptionInput, MachineStop, MaterialConsumption, OrderInput, ProductionOrder, StopInput,
    WasteLog,
};
pub use types::{InterventionStatus, MaintenanceType, OrderStatus, StopCategory, UserRole};
