// ==========================================
// 挤出线车间管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// 说明: 未配置或格式错误时回落到默认值（记录 warn）
// ==========================================

use crate::db::configure_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 报表导出
    pub const EXPORT_CSV_FILE_NAME: &str = "export_csv_file_name";
    pub const EXPORT_PDF_FILE_NAME: &str = "export_pdf_file_name";
    pub const EXPORT_TIMESTAMP_FORMAT: &str = "export_timestamp_format";
    pub const PDF_ROWS_PER_PAGE: &str = "pdf_rows_per_page";

    // 界面
    pub const UI_LOCALE: &str = "ui_locale";

    // 现场表单: 物料下拉选项（逗号分隔）
    pub const CONSUMPTION_MATERIALS: &str = "consumption_materials";
}

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const EXPORT_CSV_FILE_NAME: &str = "relatorio_pcp.csv";
    pub const EXPORT_PDF_FILE_NAME: &str = "relatorio_pcp.pdf";
    pub const EXPORT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
    pub const PDF_ROWS_PER_PAGE: usize = 30;
    pub const UI_LOCALE: &str = "pt-BR";
    pub const CONSUMPTION_MATERIALS: &str = "PP,CaCO₃,Estearato,Óleo/mineral,Aditivos";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager（再次应用统一 PRAGMA，幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取原始配置值
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        Ok(conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?)
    }

    /// 写入配置（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "key".to_string(),
                message: "配置键不能为空".to_string(),
            });
        }
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_config_value(key)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 全部配置快照（JSON 对象，按键排序）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let map = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;
        serde_json::to_string(&map).map_err(|e| RepositoryError::InternalError(e.to_string()))
    }

    // ===== 报表导出 =====

    pub fn csv_file_name(&self) -> RepositoryResult<String> {
        self.get_config_or_default(
            config_keys::EXPORT_CSV_FILE_NAME,
            defaults::EXPORT_CSV_FILE_NAME,
        )
    }

    pub fn pdf_file_name(&self) -> RepositoryResult<String> {
        self.get_config_or_default(
            config_keys::EXPORT_PDF_FILE_NAME,
            defaults::EXPORT_PDF_FILE_NAME,
        )
    }

    /// 导出时间格式（chrono strftime）
    pub fn timestamp_format(&self) -> RepositoryResult<String> {
        self.get_config_or_default(
            config_keys::EXPORT_TIMESTAMP_FORMAT,
            defaults::EXPORT_TIMESTAMP_FORMAT,
        )
    }

    /// PDF 每页行数（须 > 0）
    pub fn pdf_rows_per_page(&self) -> RepositoryResult<usize> {
        let raw = self.get_config_or_default(
            config_keys::PDF_ROWS_PER_PAGE,
            &defaults::PDF_ROWS_PER_PAGE.to_string(),
        )?;
        match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => {
                tracing::warn!(
                    config_key = config_keys::PDF_ROWS_PER_PAGE,
                    raw_value = %raw,
                    "每页行数配置无效，使用默认值"
                );
                Ok(defaults::PDF_ROWS_PER_PAGE)
            }
        }
    }

    // ===== 界面 =====

    pub fn ui_locale(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::UI_LOCALE, defaults::UI_LOCALE)
    }

    /// 物料消耗表单选项
    pub fn consumption_materials(&self) -> RepositoryResult<Vec<String>> {
        let raw = self.get_config_or_default(
            config_keys::CONSUMPTION_MATERIALS,
            defaults::CONSUMPTION_MATERIALS,
        )?;
        let materials: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if materials.is_empty() {
            Ok(defaults::CONSUMPTION_MATERIALS
                .split(',')
                .map(str::to_string)
                .collect())
        } else {
            Ok(materials)
        }
    }
}
