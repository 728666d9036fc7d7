// ==========================================
// 材料价格台账 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod import;
pub mod material;
pub mod price;
pub mod types;

// 重导出核心类型
pub use import::{
    ImportReport, ImportRow, ImportStatus, RowError, RowErrorKind, RowResult,
    DEFAULT_ERROR_DETAIL_LIMIT,
};
pub use material::{Material, PriceSource};
pub use price::{normalize_currency_code, PriceRecord, PriceRecordDraft, PriceRecordPatch};
pub use types::{CellValue, ImportRunState};
