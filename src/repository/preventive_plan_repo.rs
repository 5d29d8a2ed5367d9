// ==========================================
// 挤出线车间管理系统 - 预防性维护计划数据仓储
// ==========================================

use crate::domain::maintenance::PreventivePlanItem;
use crate::domain::types::MaintenanceType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::decode_enum;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const PLAN_COLUMNS: &str = "id, task, maintenance_type, frequency_days, last_done, next_due_date";

pub struct PreventivePlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PreventivePlanRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, item: &PreventivePlanItem) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO preventive_plans (
                task, maintenance_type, frequency_days, last_done, next_due_date
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                item.task,
                item.maintenance_type.to_db_str(),
                item.frequency_days,
                item.last_done,
                item.next_due_date,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, item: &PreventivePlanItem) -> RepositoryResult<()> {
        let id = item.id.ok_or_else(|| RepositoryError::FieldValueError {
            field: "id".to_string(),
            message: "更新计划项时ID不能为空".to_string(),
        })?;
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE preventive_plans SET
                task = ?1, maintenance_type = ?2, frequency_days = ?3,
                last_done = ?4, next_due_date = ?5
            WHERE id = ?6
            "#,
            params![
                item.task,
                item.maintenance_type.to_db_str(),
                item.frequency_days,
                item.last_done,
                item.next_due_date,
                id,
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("PreventivePlanItem", id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<PreventivePlanItem>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM preventive_plans WHERE id = ?1", PLAN_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_plan_row).optional()?)
    }

    /// 按到期时间升序
    pub fn list_by_next_due(&self) -> RepositoryResult<Vec<PreventivePlanItem>> {
        self.query_list(
            &format!(
                "SELECT {} FROM preventive_plans ORDER BY next_due_date ASC, id ASC",
                PLAN_COLUMNS
            ),
            None,
        )
    }

    /// 已到期计划项: next_due_date <= now
    pub fn list_due(&self, now: NaiveDateTime) -> RepositoryResult<Vec<PreventivePlanItem>> {
        self.query_list(
            &format!(
                "SELECT {} FROM preventive_plans WHERE next_due_date <= ?1 ORDER BY next_due_date ASC, id ASC",
                PLAN_COLUMNS
            ),
            Some(now),
        )
    }

    fn query_list(
        &self,
        sql: &str,
        bound: Option<NaiveDateTime>,
    ) -> RepositoryResult<Vec<PreventivePlanItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = match bound {
            Some(now) => stmt.query_map(params![now], map_plan_row)?,
            None => stmt.query_map([], map_plan_row)?,
        };
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn map_plan_row(row: &Row) -> rusqlite::Result<PreventivePlanItem> {
    let type_raw: String = row.get(2)?;
    Ok(PreventivePlanItem {
        id: Some(row.get(0)?),
        task: row.get(1)?,
        maintenance_type: decode_enum(2, &type_raw, MaintenanceType::from_db_str)?,
        frequency_days: row.get(3)?,
        last_done: row.get(4)?,
        next_due_date: row.get(5)?,
    })
}
