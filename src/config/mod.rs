// ==========================================
// 材料价格台账 - 配置层
// ==========================================
// 职责: 导入相关配置的读取与覆写
// 存储: config_kv 表（scope_id = 'global'）
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportConfigReader;
