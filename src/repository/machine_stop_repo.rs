// ==========================================
// 挤出线车间管理系统 - 停机记录数据仓储
// ==========================================
// 停机记录只追加，不修改
// ==========================================

use crate::domain::production::MachineStop;
use crate::domain::types::StopCategory;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::decode_enum;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const STOP_COLUMNS: &str =
    "id, production_order_id, start_time, end_time, category, sub_cause, responsible, description";

// ==========================================
// MachineStopRepository - 停机记录仓储
// ==========================================
pub struct MachineStopRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MachineStopRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加停机记录，返回自增ID
    pub fn insert(&self, stop: &MachineStop) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO machine_stops (
                production_order_id, start_time, end_time, category,
                sub_cause, responsible, description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                stop.production_order_id,
                stop.start_time,
                stop.end_time,
                stop.category.to_db_str(),
                stop.sub_cause,
                stop.responsible,
                stop.description,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<MachineStop>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM machine_stops WHERE id = ?1", STOP_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_stop_row).optional()?)
    }

    /// 按开始时间范围查询: start_time ∈ [from, until)
    pub fn find_started_between(
        &self,
        from: NaiveDateTime,
        until: Option<NaiveDateTime>,
    ) -> RepositoryResult<Vec<MachineStop>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM machine_stops
            WHERE start_time >= ?1 AND (?2 IS NULL OR start_time < ?2)
            ORDER BY start_time ASC, id ASC
            "#,
            STOP_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let stops = stmt
            .query_map(params![from, until], map_stop_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stops)
    }

    /// 查询某订单的全部停机
    pub fn find_by_order(&self, production_order_id: i64) -> RepositoryResult<Vec<MachineStop>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM machine_stops WHERE production_order_id = ?1 ORDER BY start_time ASC, id ASC",
            STOP_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let stops = stmt
            .query_map(params![production_order_id], map_stop_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stops)
    }
}

fn map_stop_row(row: &Row) -> rusqlite::Result<MachineStop> {
    let category_raw: String = row.get(4)?;
    Ok(MachineStop {
        id: Some(row.get(0)?),
        production_order_id: row.get(1)?,
        start_time: row.get(2)?,
        end_time: row.get(3)?,
        category: decode_enum(4, &category_raw, StopCategory::from_db_str)?,
        sub_cause: row.get(5)?,
        responsible: row.get(6)?,
        description: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn stop(order_id: i64, start: NaiveDateTime, category: StopCategory) -> MachineStop {
        MachineStop {
            id: None,
            production_order_id: order_id,
            start_time: start,
            end_time: start + chrono::Duration::minutes(20),
            category,
            sub_cause: "sensor".to_string(),
            responsible: "Rui".to_string(),
            description: "parada curta".to_string(),
        }
    }

    #[test]
    fn test_insert_and_range_query() {
        let repo = MachineStopRepository::new(Arc::new(Mutex::new(open_in_memory().unwrap())));
        repo.insert(&stop(1, at(3, 23), StopCategory::Electrical)).unwrap();
        let id = repo.insert(&stop(1, at(4, 8), StopCategory::Mechanical)).unwrap();
        repo.insert(&stop(2, at(4, 9), StopCategory::Quality)).unwrap();

        let today = repo.find_started_between(at(4, 0), Some(at(5, 0))).unwrap();
        assert_eq!(today.len(), 2);
        assert_eq!(today[0].id, Some(id));
        assert_eq!(today[0].category, StopCategory::Mechanical);

        assert_eq!(repo.find_by_order(1).unwrap().len(), 2);
        let loaded = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(loaded.duration_minutes(), 20.0);
    }
}
