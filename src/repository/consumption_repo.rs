// ==========================================
// 挤出线车间管理系统 - 物料消耗数据仓储
// ==========================================

use crate::domain::production::MaterialConsumption;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const CONSUMPTION_COLUMNS: &str = "id, production_order_id, material, lot, planned_qty, actual_qty";

pub struct MaterialConsumptionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaterialConsumptionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加消耗记录
    pub fn insert(&self, item: &MaterialConsumption) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO material_consumptions (
                production_order_id, material, lot, planned_qty, actual_qty
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                item.production_order_id,
                item.material,
                item.lot,
                item.planned_qty,
                item.actual_qty,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_order(&self, production_order_id: i64) -> RepositoryResult<Vec<MaterialConsumption>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM material_consumptions WHERE production_order_id = ?1 ORDER BY id ASC",
            CONSUMPTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![production_order_id], map_consumption_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }
}

fn map_consumption_row(row: &Row) -> rusqlite::Result<MaterialConsumption> {
    Ok(MaterialConsumption {
        id: Some(row.get(0)?),
        production_order_id: row.get(1)?,
        material: row.get(2)?,
        lot: row.get(3)?,
        planned_qty: row.get(4)?,
        actual_qty: row.get(5)?,
    })
}
