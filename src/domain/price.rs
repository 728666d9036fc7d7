// ==========================================
// 材料价格台账 - 价格记录领域模型
// ==========================================
// 职责: 时间版本化的价格记录（按 材料 × 来源）
// 红线: material_id / price_source_id 创建后不可修改
// 红线: valid_to 存在时 valid_from <= valid_to
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 规范化币种代码: 三位 ASCII 字母，统一大写；不合法返回 None
pub fn normalize_currency_code(value: &str) -> Option<String> {
    let code = value.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_ascii_uppercase())
    } else {
        None
    }
}

// ==========================================
// PriceRecord - 价格记录
// ==========================================
// 对齐: material_price 表
// 说明: 同一 (材料, 来源) 可以有多条记录，有效期允许重叠
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    // ===== 主键与关联 =====
    pub id: String,
    pub material_id: String,
    pub price_source_id: String,

    // ===== 价格 =====
    pub price: f64,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub currency: String,

    // ===== 有效期 =====
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>, // None = 无截止日期

    // ===== 追溯信息 =====
    pub comment: Option<String>,
    pub origin_file: Option<String>, // 导入来源文件名

    // ===== 审计字段 =====
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl PriceRecord {
    /// 判断记录在指定日期是否有效（闭区间，valid_to 为空表示开放）
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && self.valid_to.map_or(true, |to| to >= date)
    }
}

// ==========================================
// PriceRecordDraft - 待创建的价格记录
// ==========================================
// 用途: 导入对账产物 / 手工录入；id 与 created_at 由存储层生成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecordDraft {
    pub material_id: String,
    pub price_source_id: String,
    pub price: f64,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub currency: String,
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>,
    pub comment: Option<String>,
    pub origin_file: Option<String>,
    pub created_by: String,
}

impl PriceRecordDraft {
    /// 补齐 id 与创建时间，生成完整记录
    pub fn into_record(self, id: String, created_at: DateTime<Utc>) -> PriceRecord {
        PriceRecord {
            id,
            material_id: self.material_id,
            price_source_id: self.price_source_id,
            price: self.price,
            price_min: self.price_min,
            price_max: self.price_max,
            currency: self.currency,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
            comment: self.comment,
            origin_file: self.origin_file,
            created_by: self.created_by,
            created_at,
        }
    }
}

// ==========================================
// PriceRecordPatch - 单条记录修改
// ==========================================
// 不含 material_id / price_source_id 字段，关联关系不可通过修改变更
// 可空字段使用 Option<Option<T>>: None = 不修改, Some(None) = 清空
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRecordPatch {
    pub price: Option<f64>,
    pub price_min: Option<Option<f64>>,
    pub price_max: Option<Option<f64>>,
    pub currency: Option<String>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<Option<NaiveDate>>,
    pub comment: Option<Option<String>>,
}

impl PriceRecordPatch {
    pub fn is_empty(&self) -> bool {
        self == &PriceRecordPatch::default()
    }

    /// 将修改应用到已有记录，返回修改后的副本
    pub fn apply_to(&self, record: &PriceRecord) -> PriceRecord {
        let mut updated = record.clone();
        if let Some(price) = self.price {
            updated.price = price;
        }
        if let Some(price_min) = self.price_min {
            updated.price_min = price_min;
        }
        if let Some(price_max) = self.price_max {
            updated.price_max = price_max;
        }
        if let Some(currency) = &self.currency {
            updated.currency = currency.clone();
        }
        if let Some(valid_from) = self.valid_from {
            updated.valid_from = valid_from;
        }
        if let Some(valid_to) = self.valid_to {
            updated.valid_to = valid_to;
        }
        if let Some(comment) = &self.comment {
            updated.comment = comment.clone();
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_currency_code() {
        assert_eq!(normalize_currency_code(" eur ").as_deref(), Some("EUR"));
        assert_eq!(normalize_currency_code("Chf").as_deref(), Some("CHF"));
        assert!(normalize_currency_code("EURO").is_none());
        assert!(normalize_currency_code("E1R").is_none());
        assert!(normalize_currency_code("").is_none());
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_record() -> PriceRecord {
        PriceRecord {
            id: "P1".to_string(),
            material_id: "M1".to_string(),
            price_source_id: "S1".to_string(),
            price: 100.0,
            price_min: Some(90.0),
            price_max: None,
            currency: "EUR".to_string(),
            valid_from: date(2024, 1, 1),
            valid_to: Some(date(2024, 6, 30)),
            comment: None,
            origin_file: None,
            created_by: "tester".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_on_bounds_inclusive() {
        let record = sample_record();
        assert!(record.is_effective_on(date(2024, 1, 1)));
        assert!(record.is_effective_on(date(2024, 6, 30)));
        assert!(!record.is_effective_on(date(2023, 12, 31)));
        assert!(!record.is_effective_on(date(2024, 7, 1)));
    }

    #[test]
    fn test_effective_on_open_ended() {
        let mut record = sample_record();
        record.valid_to = None;
        assert!(record.is_effective_on(date(2099, 1, 1)));
    }

    #[test]
    fn test_patch_apply_and_clear() {
        let record = sample_record();
        let patch = PriceRecordPatch {
            price: Some(120.0),
            price_min: Some(None),
            valid_to: Some(None),
            comment: Some(Some("révision".to_string())),
            ..Default::default()
        };

        let updated = patch.apply_to(&record);
        assert_eq!(updated.price, 120.0);
        assert_eq!(updated.price_min, None);
        assert_eq!(updated.valid_to, None);
        assert_eq!(updated.comment.as_deref(), Some("révision"));
        assert_eq!(updated.material_id, record.material_id);
        assert_eq!(updated.price_source_id, record.price_source_id);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(PriceRecordPatch::default().is_empty());
        let patch = PriceRecordPatch {
            currency: Some("USD".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
