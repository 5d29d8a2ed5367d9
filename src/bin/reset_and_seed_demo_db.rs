// 演示库: 备份并重建数据库，写入一天的车间数据
// 用法: reset_and_seed_demo_db [db_path]

use chrono::{Duration, Local, NaiveDateTime};
use std::error::Error;
use std::fs;
use std::path::Path;

use extrusion_erp::app::{get_default_db_path, AppState};
use extrusion_erp::domain::{ConsumptionInput, InterventionInput, OrderInput, StopInput};
use extrusion_erp::{InterventionStatus, MaintenanceType, StopCategory, UserRole};

const DEMO_ORDERS: [(&str, &str, f64); 4] = [
    ("OP-1001", "Filme PP 40µ", 1200.0),
    ("OP-1002", "Filme PP 25µ", 800.0),
    ("OP-1003", "Chapa PP 2mm", 1500.0),
    ("OP-1004", "Filme PEAD", 600.0),
];

fn main() -> Result<(), Box<dyn Error>> {
    extrusion_erp::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone())?;
    let now = Local::now().naive_local();
    let shift_start = now.date().and_hms_opt(6, 0, 0).unwrap_or(now);

    seed_production(&state, shift_start.min(now), now)?;
    seed_maintenance(&state, now)?;

    // 保留生产控制会话，启动后可直接查看全部页面
    state.auth_api.login(UserRole::Control, "321")?;

    let orders = state.store.orders.list_all()?;
    eprintln!("Seeded {} -> {} orders", db_path, orders.len());
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn seed_production(
    state: &AppState,
    shift_start: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<(), Box<dyn Error>> {
    let control = state.auth_api.login(UserRole::Control, "321")?;
    let operator = state.auth_api.login(UserRole::Operational, "123")?;

    let mut ids = Vec::new();
    for (op, product, planned_kg) in DEMO_ORDERS {
        let order = state.production_api.create_order(
            &control,
            &OrderInput {
                op: op.to_string(),
                product: product.to_string(),
                lot: format!("L-{}", &op[3..]),
                planned_kg,
                operator: "Turno A".to_string(),
                notes: String::new(),
            },
        )?;
        ids.extend(order.id);
    }

    // 前两单已完成，第三单进行中，第四单待生产
    let mut t = shift_start;
    for (i, id) in ids.iter().take(3).enumerate() {
        state.production_api.activate_order(&operator, *id, t)?;
        state
            .production_api
            .log_production(&operator, DEMO_ORDERS[i].2 * 0.9, t)?;
        state.production_api.log_consumption(
            &operator,
            &ConsumptionInput {
                material: "PP".to_string(),
                lot: format!("PP-{}", i + 1),
                planned_qty: None,
                actual_qty: DEMO_ORDERS[i].2 * 0.95,
            },
        )?;
        state
            .production_api
            .log_waste(&operator, 12.5, "aparas de borda", t)?;
        t = (t + Duration::hours(2)).min(now);
    }

    state.production_api.log_stop(
        &operator,
        &StopInput {
            start_time: Some(t),
            end_time: Some((t + Duration::minutes(25)).min(now).max(t)),
            category: StopCategory::Mechanical,
            sub_cause: "rolamento da rosca".to_string(),
            responsible: "Manutenção".to_string(),
            description: "ruído anormal na rosca".to_string(),
        },
        now,
    )?;
    Ok(())
}

fn seed_maintenance(state: &AppState, now: NaiveDateTime) -> Result<(), Box<dyn Error>> {
    let mnt = state.auth_api.login(UserRole::Maintenance, "789")?;
    let api = &state.maintenance_api;

    api.add_part(&mnt, "Rolamento 6205", "ROL-6205")?;
    api.add_part(&mnt, "Resistência de zona", "RES-Z01")?;
    api.add_part(&mnt, "Correia dentada", "COR-T10")?;

    let stop_id = state
        .store
        .stops
        .find_started_between(now - Duration::days(1), None)?
        .first()
        .and_then(|s| s.id);
    api.create_intervention(
        &mnt,
        &InterventionInput {
            machine_stop_id: stop_id,
            maintenance_type: MaintenanceType::Corrective,
            responsible: "Rafael".to_string(),
            start_time: now,
            parts_used: vec!["Rolamento 6205".to_string()],
            description: "troca do rolamento".to_string(),
            status: InterventionStatus::Open,
        },
        now,
    )?;

    api.create_plan_item(&mnt, "Lubrificar redutor", MaintenanceType::Preventive, 30, now)?;
    api.create_plan_item(&mnt, "Termografia do painel", MaintenanceType::Predictive, 90, now)?;
    Ok(())
}
