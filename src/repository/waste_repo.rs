// ==========================================
// 挤出线车间管理系统 - 废料记录数据仓储
// ==========================================

use crate::domain::production::WasteLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const WASTE_COLUMNS: &str = "id, production_order_id, waste_kg, reason, log_time";

pub struct WasteLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WasteLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加废料记录
    pub fn insert(&self, log: &WasteLog) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO waste_logs (production_order_id, waste_kg, reason, log_time) VALUES (?1, ?2, ?3, ?4)",
            params![log.production_order_id, log.waste_kg, log.reason, log.log_time],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_order(&self, production_order_id: i64) -> RepositoryResult<Vec<WasteLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM waste_logs WHERE production_order_id = ?1 ORDER BY log_time ASC, id ASC",
            WASTE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![production_order_id], map_waste_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(logs)
    }

    /// 按记录时间范围查询: log_time ∈ [from, until)
    pub fn find_logged_between(
        &self,
        from: NaiveDateTime,
        until: Option<NaiveDateTime>,
    ) -> RepositoryResult<Vec<WasteLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM waste_logs WHERE log_time >= ?1 AND (?2 IS NULL OR log_time < ?2) ORDER BY log_time ASC, id ASC",
            WASTE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![from, until], map_waste_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(logs)
    }
}

fn map_waste_row(row: &Row) -> rusqlite::Result<WasteLog> {
    Ok(WasteLog {
        id: Some(row.get(0)?),
        production_order_id: row.get(1)?,
        waste_kg: row.get(2)?,
        reason: row.get(3)?,
        log_time: row.get(4)?,
    })
}
