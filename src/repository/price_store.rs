// ==========================================
// 材料价格台账 - 价格存储 Repository Trait
// ==========================================
// 职责: 定义本模块消费的外部存储接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::material::{Material, PriceSource};
use crate::domain::price::{PriceRecord, PriceRecordDraft, PriceRecordPatch};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// PriceStore Trait
// ==========================================
// 用途: 价格记录的持久化
// 实现者: SqlitePriceStore（使用 rusqlite）
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// 列出所有价格来源
    async fn list_price_sources(&self) -> RepositoryResult<Vec<PriceSource>>;

    /// 列出某材料的全部价格记录（按创建时间升序）
    ///
    /// # 参数
    /// - material_id: 材料标识
    async fn list_prices(&self, material_id: &str) -> RepositoryResult<Vec<PriceRecord>>;

    /// 按 id 查询单条价格记录
    ///
    /// # 返回
    /// - Ok(Some(record)): 找到
    /// - Ok(None): 不存在
    async fn find_price(&self, id: &str) -> RepositoryResult<Option<PriceRecord>>;

    /// 创建价格记录（id 与 created_at 由存储生成）
    ///
    /// # 返回
    /// - Ok(PriceRecord): 已创建的完整记录
    /// - Err: 存储拒绝（约束违反）或访问失败
    async fn create_price(&self, draft: PriceRecordDraft) -> RepositoryResult<PriceRecord>;

    /// 修改价格记录（材料/来源关联不可修改）
    ///
    /// # 返回
    /// - Ok(PriceRecord): 修改后的记录
    /// - Err(NotFound): 记录不存在
    async fn update_price(&self, id: &str, patch: PriceRecordPatch)
        -> RepositoryResult<PriceRecord>;

    /// 删除价格记录（硬删除，无级联）
    ///
    /// # 返回
    /// - Err(NotFound): 记录不存在
    async fn delete_price(&self, id: &str) -> RepositoryResult<()>;
}

// ==========================================
// CatalogReader Trait
// ==========================================
// 用途: 材料目录只读访问
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// 列出全部材料（按目录顺序）
    async fn list_materials(&self) -> RepositoryResult<Vec<Material>>;
}
