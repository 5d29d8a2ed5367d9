// ==========================================
// 挤出线车间管理系统 - PCP 报表 API
// ==========================================
// 职责: PCP 订单偏差视图，CSV/PDF 导出到调用方指定目录
// 空选择: CSV 静默跳过（不建文件），PDF 返回提示错误（不建文件）
// ==========================================

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::guard::{require, require_view};
use crate::config::ConfigManager;
use crate::domain::access::{Action, Screen, SessionContext};
use crate::domain::production::ProductionOrder;
use crate::engine::metrics::deviation_percent;
use crate::engine::report_export::{render_csv, render_pdf, ExportError};
use crate::i18n::t;
use crate::perf::PerfGuard;
use crate::repository::RecordStore;

/// PCP 视图行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcpRow {
    pub order: ProductionOrder,
    /// (实际 - 计划) / 计划 × 100，计划为 0 时为 0
    pub deviation_percent: f64,
}

pub struct ReportApi {
    store: Arc<RecordStore>,
    config: Arc<ConfigManager>,
}

impl ReportApi {
    pub fn new(store: Arc<RecordStore>, config: Arc<ConfigManager>) -> Self {
        Self { store, config }
    }

    /// 全部订单及偏差（ID 升序，与导出顺序一致）
    pub fn pcp_rows(&self, ctx: &SessionContext) -> ApiResult<Vec<PcpRow>> {
        require_view(ctx, &[Screen::Pcp])?;
        let rows = self
            .store
            .orders
            .list_all()?
            .into_iter()
            .map(|order| PcpRow {
                deviation_percent: deviation_percent(order.planned_kg, order.actual_kg),
                order,
            })
            .collect();
        Ok(rows)
    }

    /// 导出 CSV
    ///
    /// 返回写入的文件路径；选择为空时返回 Ok(None) 且不创建文件
    pub fn export_csv(
        &self,
        ctx: &SessionContext,
        order_ids: &[i64],
        dir: &Path,
    ) -> ApiResult<Option<PathBuf>> {
        require(ctx, Action::ExportReport)?;
        let _perf = PerfGuard::new("export_csv");

        let orders = self.store.orders.find_by_ids(order_ids)?;
        if orders.is_empty() {
            info!(requested = order_ids.len(), "CSV 导出: 选择为空，跳过");
            return Ok(None);
        }

        let bytes = render_csv(&orders, &self.config.timestamp_format()?)?;
        let path = dir.join(self.config.csv_file_name()?);
        write_file(&path, &bytes)?;

        info!(rows = orders.len(), path = %path.display(), "CSV 报表已导出");
        Ok(Some(path))
    }

    /// 导出 PDF（选择为空时返回 EmptySelection）
    pub fn export_pdf(
        &self,
        ctx: &SessionContext,
        order_ids: &[i64],
        dir: &Path,
    ) -> ApiResult<PathBuf> {
        require(ctx, Action::ExportReport)?;
        let _perf = PerfGuard::new("export_pdf");

        let orders = self.store.orders.find_by_ids(order_ids)?;
        if orders.is_empty() {
            warn!(requested = order_ids.len(), "PDF 导出: 选择为空");
            return Err(ApiError::EmptySelection(t("export.empty_selection")));
        }

        let bytes = render_pdf(&orders, self.config.pdf_rows_per_page()?)?;
        let path = dir.join(self.config.pdf_file_name()?);
        write_file(&path, &bytes)?;

        info!(rows = orders.len(), path = %path.display(), "PDF 报表已导出");
        Ok(path)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> ApiResult<()> {
    fs::write(path, bytes).map_err(ExportError::from)?;
    Ok(())
}
