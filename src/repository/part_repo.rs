// ==========================================
// 挤出线车间管理系统 - 备件目录数据仓储
// ==========================================

use crate::domain::maintenance::MaintenancePart;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

pub struct MaintenancePartRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaintenancePartRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, part: &MaintenancePart) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO maintenance_parts (name, code) VALUES (?1, ?2)",
            params![part.name, part.code],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM maintenance_parts WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(RepositoryError::not_found("MaintenancePart", id));
        }
        Ok(())
    }

    /// 按名称排序的备件目录
    pub fn list(&self) -> RepositoryResult<Vec<MaintenancePart>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, code FROM maintenance_parts ORDER BY name ASC, id ASC")?;
        let parts = stmt
            .query_map([], map_part_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(parts)
    }

    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<MaintenancePart>> {
        let conn = self.get_conn()?;
        Ok(conn
            .query_row(
                "SELECT id, name, code FROM maintenance_parts WHERE code = ?1 LIMIT 1",
                params![code],
                map_part_row,
            )
            .optional()?)
    }
}

fn map_part_row(row: &Row) -> rusqlite::Result<MaintenancePart> {
    Ok(MaintenancePart {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        code: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn test_catalog_crud() {
        let repo = MaintenancePartRepository::new(Arc::new(Mutex::new(open_in_memory().unwrap())));
        let a = repo
            .insert(&MaintenancePart {
                id: None,
                name: "Resistência".to_string(),
                code: "RS-10".to_string(),
            })
            .unwrap();
        repo.insert(&MaintenancePart {
            id: None,
            name: "Correia".to_string(),
            code: "CR-02".to_string(),
        })
        .unwrap();

        let names: Vec<_> = repo.list().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Correia", "Resistência"]);
        assert_eq!(repo.find_by_code("RS-10").unwrap().unwrap().id, Some(a));

        repo.delete(a).unwrap();
        assert!(repo.find_by_code("RS-10").unwrap().is_none());
        assert!(matches!(
            repo.delete(a).unwrap_err(),
            RepositoryError::NotFound { .. }
        ));
    }
}
