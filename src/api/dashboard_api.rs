// ==========================================
// 挤出线车间管理系统 - 驾驶舱 API
// ==========================================
// 职责: 当日产量/停机/OEE 汇总
// 时间窗: 本地当日零点起（订单按 start_time，停机按 start_time）
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::error::ApiResult;
use crate::api::guard::require_view;
use crate::domain::access::{Screen, SessionContext};
use crate::engine::metrics::{compute_metrics, DailyMetrics, TimeWindow};
use crate::perf::PerfGuard;
use crate::repository::RecordStore;

/// 驾驶舱数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub window: TimeWindow,
    pub metrics: DailyMetrics,
    /// 当日废料合计（不参与 OEE）
    pub waste_kg: f64,
    pub active_order_op: Option<String>,
}

pub struct DashboardApi {
    store: Arc<RecordStore>,
}

impl DashboardApi {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// 当日指标
    pub fn daily_metrics(
        &self,
        ctx: &SessionContext,
        now: NaiveDateTime,
    ) -> ApiResult<DashboardSnapshot> {
        self.metrics_for(ctx, TimeWindow::since_midnight(now))
    }

    /// 指定时间窗的指标
    pub fn metrics_for(
        &self,
        ctx: &SessionContext,
        window: TimeWindow,
    ) -> ApiResult<DashboardSnapshot> {
        require_view(ctx, &[Screen::Dashboard])?;
        let _perf = PerfGuard::new("dashboard_metrics");

        let orders = self
            .store
            .orders
            .find_started_between(window.from, window.until)?;
        let stops = self
            .store
            .stops
            .find_started_between(window.from, window.until)?;
        let waste_kg = self
            .store
            .waste
            .find_logged_between(window.from, window.until)?
            .iter()
            .map(|w| w.waste_kg)
            .sum();
        let active_order_op = self.store.orders.find_active()?.map(|o| o.op);

        let metrics = compute_metrics(&orders, &stops);
        debug!(
            orders = orders.len(),
            stops = stops.len(),
            oee = metrics.oee,
            "驾驶舱指标已计算"
        );

        Ok(DashboardSnapshot {
            window,
            metrics,
            waste_kg,
            active_order_op,
        })
    }
}
