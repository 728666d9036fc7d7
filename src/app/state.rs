// ==========================================
// 材料价格台账 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 存储与配置共享同一 SQLite 连接；导入器全局唯一（单任务互斥）
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{ImportApi, PriceApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::PriceImporterImpl;
use crate::repository::SqlitePriceStore;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 价格API
    pub price_api: Arc<PriceApi<SqlitePriceStore>>,

    /// 价格导入API
    pub import_api: Arc<ImportApi>,

    /// 配置管理器（覆写导入配置）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Err(String): 数据库无法打开或建表失败
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层与配置
        // ==========================================
        let store = Arc::new(SqlitePriceStore::new(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));

        // ==========================================
        // 初始化导入器与API
        // ==========================================
        let importer = Arc::new(PriceImporterImpl::new(
            store.clone(),
            ConfigManager::from_connection(conn),
        ));

        let price_api = Arc::new(PriceApi::new(store));
        let import_api = Arc::new(ImportApi::new(importer, config_manager.clone()));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            price_api,
            import_api,
            config_manager,
        })
    }
}

/// 默认数据库路径
///
/// 优先使用环境变量 MATERIAL_PRICE_LEDGER_DB_PATH，其次为用户本地数据目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("MATERIAL_PRICE_LEDGER_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./material_price_ledger.db");

    if let Some(data_dir) = dirs::data_local_dir() {
        let dir = data_dir.join("material-price-ledger");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("material_price_ledger.db");
        }
    }

    path.to_string_lossy().to_string()
}
