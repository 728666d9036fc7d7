// ==========================================
// 材料价格台账 - 时间版本化价格台账
// ==========================================
// 职责: 按日期查询有效价格；校验后委托存储创建/修改/删除
// 红线: Engine 不拼 SQL，持久化全部经由 PriceStore
// 红线: 有效期允许重叠，写入时不做冲突检测
// 规则: 多条记录同时有效时，取 created_at 最新的一条
// ==========================================

use crate::domain::price::{PriceRecord, PriceRecordDraft, PriceRecordPatch};
use crate::repository::{PriceStore, RepositoryError};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

// ==========================================
// LedgerError - 台账错误
// ==========================================
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("价格记录校验失败 (field={field}): {message}")]
    Validation { field: String, message: String },

    #[error("价格记录不存在: {0}")]
    NotFound(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for LedgerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { id, .. } => LedgerError::NotFound(id),
            other => LedgerError::Repository(other),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// 在记录集中选出指定日期的有效价格
///
/// # 参数
/// - records: 候选记录（通常为某材料的全部记录）
/// - material_id: 材料标识
/// - price_source_id: 可选来源过滤
/// - date: 查询日期
///
/// # 返回
/// - Some(record): 有效记录；多条同时有效时取 created_at 最新者（相同时取靠后者）
/// - None: 该日期无有效价格
pub fn effective_price<'a>(
    records: &'a [PriceRecord],
    material_id: &str,
    price_source_id: Option<&str>,
    date: NaiveDate,
) -> Option<&'a PriceRecord> {
    records
        .iter()
        .filter(|r| r.material_id == material_id)
        .filter(|r| price_source_id.map_or(true, |source| r.price_source_id == source))
        .filter(|r| r.is_effective_on(date))
        .max_by(|a, b| a.created_at.cmp(&b.created_at))
}

fn ensure_non_negative(field: &str, value: Option<f64>) -> LedgerResult<()> {
    match value {
        // NaN 同样拒绝
        Some(v) if !(v >= 0.0) => Err(LedgerError::Validation {
            field: field.to_string(),
            message: format!("不能为负数: {}", v),
        }),
        _ => Ok(()),
    }
}

fn ensure_window(valid_from: NaiveDate, valid_to: Option<NaiveDate>) -> LedgerResult<()> {
    match valid_to {
        Some(to) if to < valid_from => Err(LedgerError::Validation {
            field: "valid_to".to_string(),
            message: format!("截止日期 {} 早于起始日期 {}", to, valid_from),
        }),
        _ => Ok(()),
    }
}

fn validate_values(
    price: f64,
    price_min: Option<f64>,
    price_max: Option<f64>,
    valid_from: NaiveDate,
    valid_to: Option<NaiveDate>,
) -> LedgerResult<()> {
    ensure_non_negative("price", Some(price))?;
    ensure_non_negative("price_min", price_min)?;
    ensure_non_negative("price_max", price_max)?;
    ensure_window(valid_from, valid_to)
}

// ==========================================
// PriceLedger
// ==========================================
pub struct PriceLedger<S>
where
    S: PriceStore,
{
    store: Arc<S>,
}

impl<S> Clone for PriceLedger<S>
where
    S: PriceStore,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> PriceLedger<S>
where
    S: PriceStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// 查询材料在指定日期（默认今天）的有效价格
    pub async fn effective_price_as_of(
        &self,
        material_id: &str,
        price_source_id: Option<&str>,
        date: Option<NaiveDate>,
    ) -> LedgerResult<Option<PriceRecord>> {
        let date = date.unwrap_or_else(|| Local::now().date_naive());
        let records = self.store.list_prices(material_id).await?;
        let found = effective_price(&records, material_id, price_source_id, date).cloned();
        debug!(
            material_id = %material_id,
            date = %date,
            found = found.is_some(),
            "有效价格查询"
        );
        Ok(found)
    }

    /// 材料的全部价格记录（valid_from 降序）
    pub async fn history(&self, material_id: &str) -> LedgerResult<Vec<PriceRecord>> {
        let mut records = self.store.list_prices(material_id).await?;
        records.sort_by(|a, b| {
            b.valid_from
                .cmp(&a.valid_from)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(records)
    }

    /// 创建价格记录（价格 >= 0，有效期合法）
    pub async fn create(&self, draft: PriceRecordDraft) -> LedgerResult<PriceRecord> {
        validate_values(
            draft.price,
            draft.price_min,
            draft.price_max,
            draft.valid_from,
            draft.valid_to,
        )?;
        let record = self.store.create_price(draft).await?;
        Ok(record)
    }

    /// 修改价格记录
    ///
    /// 先读取原记录并合并修改，对合并结果做校验后再写入
    pub async fn update(&self, id: &str, patch: PriceRecordPatch) -> LedgerResult<PriceRecord> {
        let existing = self
            .store
            .find_price(id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;

        if patch.is_empty() {
            return Ok(existing);
        }

        let merged = patch.apply_to(&existing);
        validate_values(
            merged.price,
            merged.price_min,
            merged.price_max,
            merged.valid_from,
            merged.valid_to,
        )?;

        let updated = self.store.update_price(id, patch).await?;
        info!(price_id = %id, "价格记录已修改");
        Ok(updated)
    }

    /// 删除价格记录（硬删除，无级联）
    pub async fn delete(&self, id: &str) -> LedgerResult<()> {
        self.store.delete_price(id).await?;
        info!(price_id = %id, "价格记录已删除");
        Ok(())
    }
}
