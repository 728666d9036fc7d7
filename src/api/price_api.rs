// ==========================================
// 材料价格台账 - 价格API
// ==========================================
// 职责: 价格记录查询/维护（入参校验后委托 PriceLedger）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::material::PriceSource;
use crate::domain::price::{
    normalize_currency_code, PriceRecord, PriceRecordDraft, PriceRecordPatch,
};
use crate::engine::PriceLedger;
use crate::repository::PriceStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

/// 校验 id 非空
fn require_id(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", field)));
    }
    Ok(())
}

/// 校验并规范化币种代码（三位字母，统一大写）
fn normalize_currency(value: &str) -> ApiResult<String> {
    normalize_currency_code(value)
        .ok_or_else(|| ApiError::InvalidInput(format!("币种代码必须为三位字母: {}", value)))
}

/// 价格API
pub struct PriceApi<S>
where
    S: PriceStore,
{
    store: Arc<S>,
    ledger: PriceLedger<S>,
}

impl<S> PriceApi<S>
where
    S: PriceStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            ledger: PriceLedger::new(Arc::clone(&store)),
            store,
        }
    }

    /// 列出价格来源
    pub async fn list_price_sources(&self) -> ApiResult<Vec<PriceSource>> {
        Ok(self.store.list_price_sources().await?)
    }

    /// 材料价格历史（valid_from 降序）
    pub async fn list_prices(&self, material_id: &str) -> ApiResult<Vec<PriceRecord>> {
        require_id("material_id", material_id)?;
        Ok(self.ledger.history(material_id).await?)
    }

    /// 查询有效价格
    ///
    /// # 参数
    /// - material_id: 材料标识
    /// - price_source_id: 可选来源过滤
    /// - date: 查询日期（默认今天）
    ///
    /// # 返回
    /// - Ok(None): 该日期无有效价格
    pub async fn get_effective_price(
        &self,
        material_id: &str,
        price_source_id: Option<&str>,
        date: Option<NaiveDate>,
    ) -> ApiResult<Option<PriceRecord>> {
        require_id("material_id", material_id)?;
        Ok(self
            .ledger
            .effective_price_as_of(material_id, price_source_id, date)
            .await?)
    }

    /// 手工创建价格记录
    pub async fn create_price(&self, mut draft: PriceRecordDraft) -> ApiResult<PriceRecord> {
        require_id("material_id", &draft.material_id)?;
        require_id("price_source_id", &draft.price_source_id)?;
        require_id("created_by", &draft.created_by)?;
        draft.currency = normalize_currency(&draft.currency)?;

        let record = self.ledger.create(draft).await?;
        info!(price_id = %record.id, material_id = %record.material_id, "手工创建价格记录");
        Ok(record)
    }

    /// 修改价格记录（材料/来源关联不可修改）
    pub async fn update_price(&self, id: &str, mut patch: PriceRecordPatch) -> ApiResult<PriceRecord> {
        require_id("id", id)?;
        if let Some(currency) = &patch.currency {
            patch.currency = Some(normalize_currency(currency)?);
        }
        Ok(self.ledger.update(id, patch).await?)
    }

    /// 删除价格记录
    pub async fn delete_price(&self, id: &str) -> ApiResult<()> {
        require_id("id", id)?;
        Ok(self.ledger.delete(id).await?)
    }
}
