// ==========================================
// 材料价格台账 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 材料价格的时间版本化台账 + 外部价格表批量对账导入
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 价格规则
pub mod engine;

// 导入层 - 外部价格表
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CellValue, ImportRunState};

// 领域实体
pub use domain::{
    ImportReport, ImportRow, ImportStatus, Material, PriceRecord, PriceRecordDraft,
    PriceRecordPatch, PriceSource, RowError, RowErrorKind,
};

// 引擎
pub use engine::{effective_price, PriceLedger};

// 导入
pub use importer::{reconcile, ImportRequest, PriceImporter, PriceImporterImpl};

// API
pub use api::{ImportApi, ImportApiResponse, PriceApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "材料价格台账";
