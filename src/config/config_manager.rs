// ==========================================
// 材料价格台账 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::import::DEFAULT_ERROR_DETAIL_LIMIT;
use crate::importer::column_detector::SynonymTable;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(|e| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        })?;
        crate::db::init_schema(&conn).map_err(|e| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager（与存储共享同一连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock_error(key: &str, err: impl std::fmt::Display) -> ImportError {
        ImportError::ConfigReadError {
            key: key.to_string(),
            message: format!("锁获取失败: {}", err),
        }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| Self::lock_error(key, e))?;

        conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self.conn.lock().map_err(|e| Self::lock_error(key, e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON，键有序）
    pub fn get_config_snapshot(&self) -> ImportResult<String> {
        let conn = self.conn.lock().map_err(|e| Self::lock_error("*", e))?;
        let read_error = |e: rusqlite::Error| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        };

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")
            .map_err(read_error)?;
        let rows = stmt
            .query_map(params![GLOBAL_SCOPE], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(read_error)?;

        let mut config_map = BTreeMap::new();
        for row in rows {
            let (key, value) = row.map_err(read_error)?;
            config_map.insert(key, value);
        }

        serde_json::to_string(&config_map).map_err(|e| ImportError::ConfigSnapshotError(e.to_string()))
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ImportResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_error_detail_limit(&self) -> ImportResult<usize> {
        let default = DEFAULT_ERROR_DETAIL_LIMIT.to_string();
        let value = self.get_config_or_default(config_keys::ERROR_DETAIL_LIMIT, &default)?;
        Ok(value.trim().parse::<usize>().unwrap_or_else(|_| {
            warn!(
                config_key = config_keys::ERROR_DETAIL_LIMIT,
                raw_value = %value,
                "错误明细上限配置格式错误，使用默认值"
            );
            DEFAULT_ERROR_DETAIL_LIMIT
        }))
    }

    async fn get_default_currency(&self) -> ImportResult<String> {
        let value = self.get_config_or_default(config_keys::DEFAULT_CURRENCY, "EUR")?;
        Ok(value.trim().to_uppercase())
    }

    async fn get_default_operator(&self) -> ImportResult<String> {
        let value = self.get_config_or_default(config_keys::OPERATOR, "system")?;
        let value = value.trim();
        if value.is_empty() {
            return Ok("system".to_string());
        }
        Ok(value.to_string())
    }

    async fn get_synonym_table(&self) -> ImportResult<SynonymTable> {
        match self.get_global_config_value(config_keys::SYNONYM_TABLE)? {
            Some(raw) if !raw.trim().is_empty() => SynonymTable::from_json(&raw),
            _ => Ok(SynonymTable::default()),
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 导入结果展示
    pub const ERROR_DETAIL_LIMIT: &str = "import.error_detail_limit";

    // 导入默认值
    pub const DEFAULT_CURRENCY: &str = "import.default_currency";
    pub const OPERATOR: &str = "import.operator";

    // 列识别（JSON: {"price": ["tarif", ...], ...}）
    pub const SYNONYM_TABLE: &str = "import.synonym_table";
}
