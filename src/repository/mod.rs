// ==========================================
// 材料价格台账 - 数据访问层
// ==========================================
// 职责: 价格记录持久化与材料目录只读访问
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

pub mod error;
pub mod price_store;
pub mod price_store_impl;

pub use error::{RepositoryError, RepositoryResult};
pub use price_store::{CatalogReader, PriceStore};
pub use price_store_impl::SqlitePriceStore;
