// ==========================================
// 挤出线车间管理系统 - 本地键值存储
// ==========================================
// 会话持久化: key = "erp-user", value = {"role":"..."}
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct LocalStorageRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LocalStorageRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        Ok(conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// 写入（存在则覆盖）
    pub fn set(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// 删除；键不存在不报错
    pub fn remove(&self, key: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn test_set_overwrites_and_remove() {
        let repo = LocalStorageRepository::new(Arc::new(Mutex::new(open_in_memory().unwrap())));
        assert_eq!(repo.get("erp-user").unwrap(), None);

        repo.set("erp-user", r#"{"role":"controle"}"#).unwrap();
        repo.set("erp-user", r#"{"role":"manutencao"}"#).unwrap();
        assert_eq!(
            repo.get("erp-user").unwrap().as_deref(),
            Some(r#"{"role":"manutencao"}"#)
        );

        repo.remove("erp-user").unwrap();
        repo.remove("erp-user").unwrap();
        assert_eq!(repo.get("erp-user").unwrap(), None);
    }
}
