// ==========================================
// 材料价格台账 - 应用层
// ==========================================
// 职责: 组装存储、配置、导入器与API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
