// ==========================================
// 挤出线车间管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod consumption_repo;
pub mod error;
pub mod machine_stop_repo;
pub mod maintenance_repo;
pub mod part_repo;
pub mod preventive_plan_repo;
pub mod production_order_repo;
pub(crate) mod row_codec;
pub mod session_repo;
pub mod waste_repo;

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// 重导出核心仓储
pub use consumption_repo::MaterialConsumptionRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use machine_stop_repo::MachineStopRepository;
pub use maintenance_repo::MaintenanceInterventionRepository;
pub use part_repo::MaintenancePartRepository;
pub use preventive_plan_repo::PreventivePlanRepository;
pub use production_order_repo::{ActivationOutcome, ProductionOrderRepository};
pub use session_repo::LocalStorageRepository;
pub use waste_repo::WasteLogRepository;

// ==========================================
// RecordStore - 共享同一连接的全部仓储
// ==========================================
pub struct RecordStore {
    pub orders: Arc<ProductionOrderRepository>,
    pub stops: Arc<MachineStopRepository>,
    pub interventions: Arc<MaintenanceInterventionRepository>,
    pub consumptions: Arc<MaterialConsumptionRepository>,
    pub waste: Arc<WasteLogRepository>,
    pub parts: Arc<MaintenancePartRepository>,
    pub plans: Arc<PreventivePlanRepository>,
    pub local_storage: Arc<LocalStorageRepository>,
}

impl RecordStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            orders: Arc::new(ProductionOrderRepository::new(conn.clone())),
            stops: Arc::new(MachineStopRepository::new(conn.clone())),
            interventions: Arc::new(MaintenanceInterventionRepository::new(conn.clone())),
            consumptions: Arc::new(MaterialConsumptionRepository::new(conn.clone())),
            waste: Arc::new(WasteLogRepository::new(conn.clone())),
            parts: Arc::new(MaintenancePartRepository::new(conn.clone())),
            plans: Arc::new(PreventivePlanRepository::new(conn.clone())),
            local_storage: Arc::new(LocalStorageRepository::new(conn)),
        }
    }
}
