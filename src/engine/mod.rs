// ==========================================
// 材料价格台账 - 引擎层
// ==========================================
// 职责: 价格业务规则（有效价格选取、写入校验）
// 红线: Engine 不拼 SQL，所有校验失败必须给出字段与原因
// ==========================================

pub mod price_ledger;

pub use price_ledger::{effective_price, LedgerError, LedgerResult, PriceLedger};
