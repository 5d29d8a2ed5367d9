// ==========================================
// 挤出线车间管理系统 - 维护工单数据仓储
// ==========================================
// parts_used 以逗号拼接串存储
// ==========================================

use crate::domain::maintenance::MaintenanceIntervention;
use crate::domain::types::{InterventionStatus, MaintenanceType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::decode_enum;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const INTERVENTION_COLUMNS: &str = "id, machine_stop_id, maintenance_type, responsible, start_time, end_time, parts_used, description, status";

pub struct MaintenanceInterventionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaintenanceInterventionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, item: &MaintenanceIntervention) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO maintenance_interventions (
                machine_stop_id, maintenance_type, responsible, start_time,
                end_time, parts_used, description, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                item.machine_stop_id,
                item.maintenance_type.to_db_str(),
                item.responsible,
                item.start_time,
                item.end_time,
                item.parts_to_db(),
                item.description,
                item.status.to_db_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按ID整行更新
    pub fn update(&self, item: &MaintenanceIntervention) -> RepositoryResult<()> {
        let id = item.id.ok_or_else(|| RepositoryError::FieldValueError {
            field: "id".to_string(),
            message: "更新维护工单时ID不能为空".to_string(),
        })?;

        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE maintenance_interventions SET
                machine_stop_id = ?1, maintenance_type = ?2, responsible = ?3,
                start_time = ?4, end_time = ?5, parts_used = ?6,
                description = ?7, status = ?8
            WHERE id = ?9
            "#,
            params![
                item.machine_stop_id,
                item.maintenance_type.to_db_str(),
                item.responsible,
                item.start_time,
                item.end_time,
                item.parts_to_db(),
                item.description,
                item.status.to_db_str(),
                id,
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("MaintenanceIntervention", id));
        }
        Ok(())
    }

    /// 仅更新状态与结束时间
    pub fn set_status(
        &self,
        id: i64,
        status: InterventionStatus,
        end_time: Option<NaiveDateTime>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE maintenance_interventions SET status = ?1, end_time = ?2 WHERE id = ?3",
            params![status.to_db_str(), end_time, id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("MaintenanceIntervention", id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<MaintenanceIntervention>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM maintenance_interventions WHERE id = ?1",
            INTERVENTION_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![id], map_intervention_row)
            .optional()?)
    }

    /// 全部工单（开始时间倒序）
    pub fn list_newest_by_start(&self) -> RepositoryResult<Vec<MaintenanceIntervention>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM maintenance_interventions ORDER BY start_time DESC, id DESC",
            INTERVENTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map([], map_intervention_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// 关联某停机的工单
    pub fn find_by_stop(&self, machine_stop_id: i64) -> RepositoryResult<Vec<MaintenanceIntervention>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM maintenance_interventions WHERE machine_stop_id = ?1 ORDER BY start_time DESC, id DESC",
            INTERVENTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![machine_stop_id], map_intervention_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }
}

fn map_intervention_row(row: &Row) -> rusqlite::Result<MaintenanceIntervention> {
    let type_raw: String = row.get(2)?;
    let parts_raw: String = row.get(6)?;
    let status_raw: String = row.get(8)?;
    Ok(MaintenanceIntervention {
        id: Some(row.get(0)?),
        machine_stop_id: row.get(1)?,
        maintenance_type: decode_enum(2, &type_raw, MaintenanceType::from_db_str)?,
        responsible: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        parts_used: MaintenanceIntervention::parts_from_db(&parts_raw),
        description: row.get(7)?,
        status: decode_enum(8, &status_raw, InterventionStatus::from_db_str)?,
    })
}
