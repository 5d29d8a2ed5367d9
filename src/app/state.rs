// ==========================================
// 挤出线车间管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 所有仓储共享同一个 SQLite 连接
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AuthApi, DashboardApi, MaintenanceApi, ProductionApi, ReportApi};
use crate::app::router::ViewRouter;
use crate::config::ConfigManager;
use crate::db::open_and_migrate;
use crate::engine::events::{BroadcastEventPublisher, StoreEventPublisher};
use crate::perf::install_sqlite_tracing;
use crate::repository::RecordStore;

/// 数据库路径环境变量
pub const ENV_DB_PATH: &str = "EXTRUSION_ERP_DB_PATH";

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    pub store: Arc<RecordStore>,
    pub config: Arc<ConfigManager>,

    /// 变更通知（界面订阅后重新计算）
    pub events: Arc<BroadcastEventPublisher>,

    pub auth_api: Arc<AuthApi>,
    pub production_api: Arc<ProductionApi>,
    pub maintenance_api: Arc<MaintenanceApi>,
    pub dashboard_api: Arc<DashboardApi>,
    pub report_api: Arc<ReportApi>,
    pub router: Arc<ViewRouter>,
}

impl AppState {
    /// 打开数据库（建表幂等）并装配全部 API
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let mut conn =
            open_and_migrate(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        install_sqlite_tracing(&mut conn);
        let conn = Arc::new(Mutex::new(conn));

        let store = Arc::new(RecordStore::new(conn.clone()));
        let config = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let events = Arc::new(BroadcastEventPublisher::default());
        let publisher: Arc<dyn StoreEventPublisher> = events.clone();

        let auth_api = Arc::new(AuthApi::new(store.local_storage.clone()));
        let production_api = Arc::new(ProductionApi::new(
            store.clone(),
            config.clone(),
            publisher.clone(),
        ));
        let maintenance_api = Arc::new(MaintenanceApi::new(store.clone(), publisher));
        let dashboard_api = Arc::new(DashboardApi::new(store.clone()));
        let report_api = Arc::new(ReportApi::new(store.clone(), config.clone()));
        let router = Arc::new(ViewRouter::new(store.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            store,
            config,
            events,
            auth_api,
            production_api,
            maintenance_api,
            dashboard_api,
            report_api,
            router,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(ENV_DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./extrusion_erp.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        let dir = data_dir.join("extrusion-erp-dev");
        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("extrusion-erp");

        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("extrusion_erp.db"),
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "数据目录创建失败，使用当前目录"),
        }
    }

    path.to_string_lossy().to_string()
}
