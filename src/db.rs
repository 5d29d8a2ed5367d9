// ==========================================
// 挤出线车间管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 启动时建表/建索引（幂等），记录 schema_version
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// v1: 订单/停机/维护工单/物料消耗/废料
/// v2: 新增备件目录与预防性维护计划
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：子记录对订单是软引用，这里不开启 foreign_keys 也不声明 REFERENCES。
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开连接并确保 schema 就绪
pub fn open_and_migrate(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// 内存库（测试/演示用）
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// 建表与索引（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS production_orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            op TEXT NOT NULL,
            product TEXT NOT NULL,
            lot TEXT NOT NULL,
            planned_kg REAL NOT NULL DEFAULT 0,
            actual_kg REAL NOT NULL DEFAULT 0,
            operator TEXT NOT NULL,
            notes TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL,
            start_time TEXT,
            end_time TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_orders_op ON production_orders(op);
        CREATE INDEX IF NOT EXISTS idx_orders_product ON production_orders(product);
        CREATE INDEX IF NOT EXISTS idx_orders_status ON production_orders(status);
        CREATE INDEX IF NOT EXISTS idx_orders_start ON production_orders(start_time);

        CREATE TABLE IF NOT EXISTS machine_stops (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            production_order_id INTEGER NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            category TEXT NOT NULL,
            sub_cause TEXT NOT NULL DEFAULT '',
            responsible TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT ''
        );
        CREATE INDEX IF NOT EXISTS idx_stops_order ON machine_stops(production_order_id);
        CREATE INDEX IF NOT EXISTS idx_stops_start ON machine_stops(start_time);

        CREATE TABLE IF NOT EXISTS maintenance_interventions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            machine_stop_id INTEGER,
            maintenance_type TEXT NOT NULL,
            responsible TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT,
            parts_used TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_interventions_stop ON maintenance_interventions(machine_stop_id);
        CREATE INDEX IF NOT EXISTS idx_interventions_start_type
            ON maintenance_interventions(start_time, maintenance_type);

        CREATE TABLE IF NOT EXISTS material_consumptions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            production_order_id INTEGER NOT NULL,
            material TEXT NOT NULL,
            lot TEXT NOT NULL,
            planned_qty REAL,
            actual_qty REAL NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_consumptions_order ON material_consumptions(production_order_id);
        CREATE INDEX IF NOT EXISTS idx_consumptions_material ON material_consumptions(material);

        CREATE TABLE IF NOT EXISTS waste_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            production_order_id INTEGER NOT NULL,
            waste_kg REAL NOT NULL,
            reason TEXT NOT NULL,
            log_time TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_waste_order ON waste_logs(production_order_id);
        CREATE INDEX IF NOT EXISTS idx_waste_time ON waste_logs(log_time);

        CREATE TABLE IF NOT EXISTS maintenance_parts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            code TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_parts_name ON maintenance_parts(name);
        CREATE INDEX IF NOT EXISTS idx_parts_code ON maintenance_parts(code);

        CREATE TABLE IF NOT EXISTS preventive_plans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            task TEXT NOT NULL,
            maintenance_type TEXT NOT NULL,
            frequency_days INTEGER NOT NULL,
            last_done TEXT,
            next_due_date TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_plans_next_due ON preventive_plans(next_due_date);

        CREATE TABLE IF NOT EXISTS local_storage (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
