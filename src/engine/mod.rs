// ==========================================
// 挤出线车间管理系统 - 引擎层
// ==========================================
// 职责: 指标聚合 / 报表渲染 / 存储变更事件
// 红线: Engine 不拼 SQL，只处理已加载的记录
// ==========================================

pub mod events;
pub mod metrics;
pub mod report_export;

// 重导出核心引擎
pub use events::{
    BroadcastEventPublisher, ChangeKind, Collection, NoOpEventPublisher, StoreEvent,
    StoreEventPublisher,
};
pub use metrics::{
    compute_metrics, deviation_percent, downtime_by_category, CategoryDowntime, DailyMetrics,
    OrderOutput, TimeWindow, SCHEDULED_MINUTES_PER_DAY,
};
pub use report_export::{render_csv, render_pdf, ExportError, ExportResult};
