// ==========================================
// 材料价格台账 - 导入层
// ==========================================
// 职责: 外部价格表对账导入，生成价格记录
// 支持: Excel, CSV, 粘贴的制表符文本
// ==========================================

// 模块声明
pub mod column_detector;
pub mod entity_resolver;
pub mod error;
pub mod file_parser;
pub mod header_normalizer;
pub mod price_importer_impl;
pub mod price_importer_trait;
pub mod reconcile;
pub mod row_parser;

// 重导出核心类型
pub use column_detector::{detect_columns, ColumnMap, PriceField, SynonymTable};
pub use entity_resolver::resolve_material;
pub use error::{ImportError, ImportResult};
pub use file_parser::{parse_pasted_text, CsvParser, ExcelParser, RawTable, UniversalFileParser};
pub use header_normalizer::{normalize_header, normalize_text};
pub use price_importer_impl::PriceImporterImpl;
pub use reconcile::{plan_rows, reconcile, ImportPolicy, PendingPrice, RowOutcome};
pub use row_parser::{parse_row, DropReason, RowParse};

// 重导出 Trait 接口
pub use price_importer_trait::{FileParser, ImportRequest, PriceImporter};
