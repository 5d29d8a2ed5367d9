// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 在临时数据库上装配全部 API，提供会话与订单准备函数
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

pub use test_helpers::at;

use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};

use extrusion_erp::api::{AuthApi, DashboardApi, MaintenanceApi, ProductionApi, ReportApi};
use extrusion_erp::app::{AppState, ViewRouter};
use extrusion_erp::config::ConfigManager;
use extrusion_erp::domain::{OrderInput, ProductionOrder, SessionContext};
use extrusion_erp::engine::{BroadcastEventPublisher, StoreEvent};
use extrusion_erp::repository::RecordStore;
use extrusion_erp::UserRole;

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含所有API实例和必要的依赖
pub struct ApiTestEnv {
    pub db_path: String,
    pub auth_api: Arc<AuthApi>,
    pub production_api: Arc<ProductionApi>,
    pub maintenance_api: Arc<MaintenanceApi>,
    pub dashboard_api: Arc<DashboardApi>,
    pub report_api: Arc<ReportApi>,
    pub router: Arc<ViewRouter>,

    // Repository层（用于测试数据准备）
    pub store: Arc<RecordStore>,
    pub config: Arc<ConfigManager>,
    pub events: Arc<BroadcastEventPublisher>,

    /// 导出目录
    pub export_dir: TempDir,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的API测试环境
    pub fn new() -> Result<Self, String> {
        extrusion_erp::logging::init_test();

        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;
        let state = AppState::new(db_path.clone())?;
        let export_dir = TempDir::new().map_err(|e| format!("创建导出目录失败: {}", e))?;

        Ok(Self {
            db_path,
            auth_api: state.auth_api,
            production_api: state.production_api,
            maintenance_api: state.maintenance_api,
            dashboard_api: state.dashboard_api,
            report_api: state.report_api,
            router: state.router,
            store: state.store,
            config: state.config,
            events: state.events,
            export_dir,
            _temp_file: temp_file,
        })
    }

    pub fn control(&self) -> SessionContext {
        SessionContext::new(UserRole::Control)
    }

    pub fn operator(&self) -> SessionContext {
        SessionContext::new(UserRole::Operational)
    }

    pub fn maintenance(&self) -> SessionContext {
        SessionContext::new(UserRole::Maintenance)
    }

    /// 以生产控制身份创建订单
    pub fn create_order(&self, input: &OrderInput) -> ProductionOrder {
        self.production_api
            .create_order(&self.control(), input)
            .expect("创建订单失败")
    }

    /// 创建订单并返回ID
    pub fn create_order_id(&self, input: &OrderInput) -> i64 {
        self.create_order(input).id.expect("订单缺少ID")
    }

    /// 取出当前已发布的全部事件
    pub fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<StoreEvent>) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }
}
