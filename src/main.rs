// ==========================================
// 挤出线车间管理系统 - 主入口
// ==========================================
// 用法:
//   extrusion-erp                    启动自检并输出当日概况
//   extrusion-erp export-csv <dir>   以已保存会话导出全部订单 CSV
//   extrusion-erp export-pdf <dir>   以已保存会话导出全部订单 PDF
// ==========================================

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Local;

use extrusion_erp::app::{get_default_db_path, AppState};
use extrusion_erp::i18n::{self, t_with_args};
use extrusion_erp::SessionContext;

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    extrusion_erp::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", extrusion_erp::APP_NAME);
    tracing::info!("系统版本: {}", extrusion_erp::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    let locale = state.config.ui_locale()?;
    if !i18n::set_locale(&locale) {
        tracing::warn!(locale = %locale, "界面语言配置无效，保持默认");
    }
    tracing::debug!(config = %state.config.get_config_snapshot()?, "当前配置快照");

    let session = state.auth_api.restore_session()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None => print_summary(&state, session),
        Some(cmd @ ("export-csv" | "export-pdf")) => {
            let Some(ctx) = session else {
                bail!("未登录，无法导出报表");
            };
            let dir = args
                .get(1)
                .map(PathBuf::from)
                .context("缺少导出目录参数")?;
            export_all(&state, &ctx, cmd == "export-pdf", dir)
        }
        Some(other) => bail!("未知命令: {}", other),
    }
}

fn print_summary(state: &AppState, session: Option<SessionContext>) -> anyhow::Result<()> {
    let Some(ctx) = session else {
        tracing::info!("未找到已保存的会话，等待登录");
        return Ok(());
    };
    let role_label = i18n::t(ctx.role.label_key());
    tracing::info!(
        "{}",
        t_with_args("auth.session_restored", &[("role", role_label.as_str())])
    );

    let menu = state.router.menu(&ctx);
    let labels: Vec<&str> = menu.iter().map(|m| m.label.as_str()).collect();
    tracing::info!(menu = ?labels, "可访问页面");

    let snapshot = state
        .dashboard_api
        .daily_metrics(&ctx, Local::now().naive_local())?;
    tracing::info!(
        planned_kg = snapshot.metrics.total_planned_kg,
        actual_kg = snapshot.metrics.total_actual_kg,
        downtime_min = snapshot.metrics.downtime_minutes_rounded(),
        oee_percent = snapshot.metrics.oee_percent(),
        active_order = ?snapshot.active_order_op,
        "当日概况"
    );
    Ok(())
}

fn export_all(
    state: &AppState,
    ctx: &SessionContext,
    pdf: bool,
    dir: PathBuf,
) -> anyhow::Result<()> {
    let ids: Vec<i64> = state
        .store
        .orders
        .list_all()?
        .iter()
        .filter_map(|o| o.id)
        .collect();

    let written = if pdf {
        state.report_api.export_pdf(ctx, &ids, &dir).map(Some)
    } else {
        state.report_api.export_csv(ctx, &ids, &dir)
    }
    .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    match written {
        Some(path) => {
            let path = path.display().to_string();
            tracing::info!("{}", t_with_args("export.written", &[("path", path.as_str())]));
        }
        None => tracing::info!("{}", i18n::t("export.empty_selection")),
    }
    Ok(())
}
