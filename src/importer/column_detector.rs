// ==========================================
// 材料价格台账 - 列识别
// ==========================================
// 职责: 归一化表头 → 语义字段（简称/描述/价格/最低价/最高价）
// 规则: 每个字段独立识别，按同义词优先级依次尝试；
//       每个同义词从左到右扫描表头，取第一个包含该词的列；
//       价格列跳过命中多词最低/最高价同义词的列（"prix min" 含 "prix"）
// 性质: 相同表头 + 相同同义词表 ⇒ 相同结果
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_normalizer::normalize_text;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// PriceField - 语义字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Abbreviation,
    Description,
    Price,
    PriceMin,
    PriceMax,
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceField::Abbreviation => write!(f, "abbreviation"),
            PriceField::Description => write!(f, "description"),
            PriceField::Price => write!(f, "price"),
            PriceField::PriceMin => write!(f, "price_min"),
            PriceField::PriceMax => write!(f, "price_max"),
        }
    }
}

// ==========================================
// SynonymTable - 同义词表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymTable {
    pub abbreviation: Vec<String>,
    pub description: Vec<String>,
    pub price: Vec<String>,
    pub price_min: Vec<String>,
    pub price_max: Vec<String>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::from_lists(
            &["abrégé", "abrege", "abrev", "abbreviation", "code", "matière", "matiere"],
            &["description", "desc", "libellé", "libelle", "nom"],
            &["prix", "price", "montant", "amount"],
            &["prix min", "prix_min", "price min", "price_min", "min", "minimum"],
            &["prix max", "prix_max", "price max", "price_max", "max", "maximum"],
        )
    }
}

/// 配置覆写格式（缺省字段沿用默认同义词）
#[derive(Debug, Default, Deserialize)]
struct SynonymTableOverride {
    abbreviation: Option<Vec<String>>,
    description: Option<Vec<String>>,
    price: Option<Vec<String>>,
    price_min: Option<Vec<String>>,
    price_max: Option<Vec<String>>,
}

impl SynonymTable {
    /// 由原始同义词列表构造（同义词会被归一化）
    pub fn from_lists(
        abbreviation: &[&str],
        description: &[&str],
        price: &[&str],
        price_min: &[&str],
        price_max: &[&str],
    ) -> Self {
        let norm = |list: &[&str]| -> Vec<String> {
            list.iter()
                .map(|s| normalize_text(s))
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            abbreviation: norm(abbreviation),
            description: norm(description),
            price: norm(price),
            price_min: norm(price_min),
            price_max: norm(price_max),
        }
    }

    /// 从 JSON 配置构造，例如 {"price": ["tarif", "prix"]}
    pub fn from_json(raw: &str) -> ImportResult<Self> {
        let overrides: SynonymTableOverride =
            serde_json::from_str(raw).map_err(|e| ImportError::ConfigValueError {
                key: "import.synonym_table".to_string(),
                value: raw.to_string(),
                message: e.to_string(),
            })?;

        let mut table = SynonymTable::default();
        let norm = |list: Vec<String>| -> Vec<String> {
            list.iter()
                .map(|s| normalize_text(s))
                .filter(|s| !s.is_empty())
                .collect()
        };
        if let Some(list) = overrides.abbreviation {
            table.abbreviation = norm(list);
        }
        if let Some(list) = overrides.description {
            table.description = norm(list);
        }
        if let Some(list) = overrides.price {
            table.price = norm(list);
        }
        if let Some(list) = overrides.price_min {
            table.price_min = norm(list);
        }
        if let Some(list) = overrides.price_max {
            table.price_max = norm(list);
        }
        Ok(table)
    }

    pub fn synonyms(&self, field: PriceField) -> &[String] {
        match field {
            PriceField::Abbreviation => &self.abbreviation,
            PriceField::Description => &self.description,
            PriceField::Price => &self.price,
            PriceField::PriceMin => &self.price_min,
            PriceField::PriceMax => &self.price_max,
        }
    }
}

// ==========================================
// ColumnMap - 字段 → 列索引
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub abbreviation: Option<usize>,
    pub description: Option<usize>,
    pub price: Option<usize>,
    pub price_min: Option<usize>,
    pub price_max: Option<usize>,
}

impl ColumnMap {
    /// 粘贴文本的固定列布局: 标签<TAB>价格<TAB>最低价?<TAB>最高价?
    ///
    /// 标签同时作为简称与描述参与匹配
    pub fn pasted_text() -> Self {
        Self {
            abbreviation: Some(0),
            description: Some(0),
            price: Some(1),
            price_min: Some(2),
            price_max: Some(3),
        }
    }

    pub fn get(&self, field: PriceField) -> Option<usize> {
        match field {
            PriceField::Abbreviation => self.abbreviation,
            PriceField::Description => self.description,
            PriceField::Price => self.price,
            PriceField::PriceMin => self.price_min,
            PriceField::PriceMax => self.price_max,
        }
    }

    /// 前置校验: 价格列必须存在，且简称/描述至少存在一列
    pub fn ensure_required(&self) -> ImportResult<()> {
        if self.price.is_none() {
            return Err(ImportError::MissingRequiredColumn(PriceField::Price.to_string()));
        }
        if self.abbreviation.is_none() && self.description.is_none() {
            return Err(ImportError::MissingRequiredColumn(format!(
                "{} / {}",
                PriceField::Abbreviation,
                PriceField::Description
            )));
        }
        Ok(())
    }
}

/// 识别列（表头须已归一化）
pub fn detect_columns(headers: &[String], table: &SynonymTable) -> ColumnMap {
    // 命中多词最低/最高价同义词的列不参与价格识别
    let range_columns: Vec<bool> = headers
        .iter()
        .map(|header| {
            table
                .price_min
                .iter()
                .chain(table.price_max.iter())
                .filter(|synonym| synonym.contains(' '))
                .any(|synonym| header.contains(synonym.as_str()))
        })
        .collect();

    let find = |field: PriceField| -> Option<usize> {
        table.synonyms(field).iter().find_map(|synonym| {
            headers
                .iter()
                .enumerate()
                .filter(|(idx, _)| field != PriceField::Price || !range_columns[*idx])
                .find(|(_, header)| header.contains(synonym.as_str()))
                .map(|(idx, _)| idx)
        })
    };

    ColumnMap {
        abbreviation: find(PriceField::Abbreviation),
        description: find(PriceField::Description),
        price: find(PriceField::Price),
        price_min: find(PriceField::PriceMin),
        price_max: find(PriceField::PriceMax),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|h| normalize_text(h)).collect()
    }

    #[test]
    fn test_detect_simple_sheet() {
        let map = detect_columns(&headers(&["Abrégé", "Prix"]), &SynonymTable::default());
        assert_eq!(map.abbreviation, Some(0));
        assert_eq!(map.price, Some(1));
        assert_eq!(map.description, None);
        assert!(map.ensure_required().is_ok());
    }

    #[test]
    fn test_detect_min_max_before_price() {
        let map = detect_columns(
            &headers(&["Prix min", "Code", "Prix max", "Libellé", "Prix"]),
            &SynonymTable::default(),
        );
        assert_eq!(map.price_min, Some(0));
        assert_eq!(map.abbreviation, Some(1));
        assert_eq!(map.price_max, Some(2));
        assert_eq!(map.description, Some(3));
        assert_eq!(map.price, Some(4));
    }

    #[test]
    fn test_detect_synonym_priority_over_position() {
        // "prix" 优先于 "amount"，即使 amount 列更靠左
        let map = detect_columns(
            &headers(&["Description", "Amount", "Prix unitaire"]),
            &SynonymTable::default(),
        );
        assert_eq!(map.price, Some(2));
        assert_eq!(map.description, Some(0));
    }

    #[test]
    fn test_detect_first_matching_header_wins() {
        let map = detect_columns(
            &headers(&["Nom", "Prix HT", "Prix TTC"]),
            &SynonymTable::default(),
        );
        assert_eq!(map.price, Some(1));
    }

    #[test]
    fn test_detect_deterministic() {
        let hs = headers(&["Matière", "Désignation", "Montant", "Minimum", "Maximum"]);
        let table = SynonymTable::default();
        let first = detect_columns(&hs, &table);
        for _ in 0..5 {
            assert_eq!(detect_columns(&hs, &table), first);
        }
    }

    #[test]
    fn test_description_header_containing_min() {
        // "denomination" 同时包含 "min" 与 "nom"，描述列不受最低价识别影响
        let table = SynonymTable::default();

        let map = detect_columns(&headers(&["Dénomination", "Prix"]), &table);
        assert_eq!(map.description, Some(0));
        assert_eq!(map.price, Some(1));
        assert!(map.ensure_required().is_ok());

        let map = detect_columns(&headers(&["Code", "Dénomination", "Prix"]), &table);
        assert_eq!(map.abbreviation, Some(0));
        assert_eq!(map.description, Some(1));
        assert_eq!(map.price, Some(2));
        assert!(map.ensure_required().is_ok());
    }

    #[test]
    fn test_price_header_with_bare_min_kept() {
        // "administratif" 含 "min"，但不是多词区间同义词，仍可作为价格列
        let map = detect_columns(
            &headers(&["Code", "Prix administratif"]),
            &SynonymTable::default(),
        );
        assert_eq!(map.price, Some(1));
    }

    #[test]
    fn test_missing_price_rejected() {
        let map = detect_columns(&headers(&["Abrégé", "Libellé"]), &SynonymTable::default());
        let err = map.ensure_required().unwrap_err();
        assert!(matches!(err, ImportError::MissingRequiredColumn(_)));
    }

    #[test]
    fn test_missing_identifier_rejected() {
        let map = detect_columns(&headers(&["Fournisseur", "Prix"]), &SynonymTable::default());
        assert!(map.ensure_required().is_err());
    }

    #[test]
    fn test_synonym_table_from_json_override() {
        let table = SynonymTable::from_json(r#"{"price": ["Tarif"]}"#).unwrap();
        assert_eq!(table.price, vec!["tarif".to_string()]);
        assert_eq!(table.abbreviation, SynonymTable::default().abbreviation);

        let map = detect_columns(&headers(&["Code", "Tarif"]), &table);
        assert_eq!(map.price, Some(1));
    }

    #[test]
    fn test_synonym_table_from_invalid_json() {
        assert!(matches!(
            SynonymTable::from_json("not json"),
            Err(ImportError::ConfigValueError { .. })
        ));
    }

    #[test]
    fn test_pasted_text_layout() {
        let map = ColumnMap::pasted_text();
        assert_eq!(map.get(PriceField::Abbreviation), Some(0));
        assert_eq!(map.get(PriceField::Description), Some(0));
        assert_eq!(map.get(PriceField::Price), Some(1));
        assert!(map.ensure_required().is_ok());
    }
}
