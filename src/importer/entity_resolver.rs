// ==========================================
// 材料价格台账 - 实体匹配
// ==========================================
// 职责: 候选导入行 → 目录中的材料
// 规则（命中即止）:
// 1. 简称 与 Material.abbreviation 忽略大小写完全相等
// 2. 描述 被 Material.description 忽略大小写包含（按目录顺序取第一个）
// 3. 否则匹配失败，携带行的原始识别文本
// 说明: 目录规模小，线性扫描，不建索引；不修改目录
// ==========================================

use crate::domain::import::{ImportRow, RowError, RowErrorKind};
use crate::domain::material::Material;

/// 匹配材料
pub fn resolve_material<'a>(
    row: &ImportRow,
    catalog: &'a [Material],
) -> Result<&'a Material, RowError> {
    if row.abbreviation.is_none() && row.description.is_none() {
        return Err(unresolved(row, "缺少简称与描述，无法匹配材料".to_string()));
    }

    if let Some(abbreviation) = &row.abbreviation {
        let wanted = abbreviation.to_lowercase();
        if let Some(material) = catalog
            .iter()
            .find(|m| m.abbreviation.trim().to_lowercase() == wanted)
        {
            return Ok(material);
        }
    }

    if let Some(description) = &row.description {
        let wanted = description.to_lowercase();
        if let Some(material) = catalog
            .iter()
            .find(|m| m.description.to_lowercase().contains(&wanted))
        {
            return Ok(material);
        }
    }

    Err(unresolved(
        row,
        format!("未找到匹配的材料: {}", row.row_ref()),
    ))
}

fn unresolved(row: &ImportRow, reason: String) -> RowError {
    RowError {
        row_number: row.row_number,
        row_ref: row.row_ref(),
        kind: RowErrorKind::Unresolved,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(id: &str, abbreviation: &str, description: &str) -> Material {
        Material {
            id: id.to_string(),
            abbreviation: abbreviation.to_string(),
            description: description.to_string(),
            unit: "t".to_string(),
        }
    }

    fn catalog() -> Vec<Material> {
        vec![
            material("M1", "PET", "Polyéthylène téréphtalate"),
            material("M2", "CARTON", "Carton ondulé"),
            material("M3", "PEHD", "Polyéthylène haute densité PET recyclé"),
        ]
    }

    fn row(abbreviation: Option<&str>, description: Option<&str>) -> ImportRow {
        ImportRow {
            row_number: 2,
            abbreviation: abbreviation.map(str::to_string),
            description: description.map(str::to_string),
            price: 10.0,
            price_min: None,
            price_max: None,
        }
    }

    #[test]
    fn test_abbreviation_case_insensitive() {
        let catalog = catalog();
        let hit = resolve_material(&row(Some("carton"), None), &catalog).unwrap();
        assert_eq!(hit.id, "M2");
    }

    #[test]
    fn test_abbreviation_beats_description() {
        let catalog = catalog();
        // 简称命中 M1，描述子串命中 M3
        let hit = resolve_material(&row(Some("PET"), Some("haute densité")), &catalog).unwrap();
        assert_eq!(hit.id, "M1");
    }

    #[test]
    fn test_description_substring_first_in_catalog_order() {
        let catalog = catalog();
        let hit = resolve_material(&row(Some("XYZ"), Some("POLYÉTHYLÈNE")), &catalog).unwrap();
        assert_eq!(hit.id, "M1");
    }

    #[test]
    fn test_description_only() {
        let catalog = catalog();
        let hit = resolve_material(&row(None, Some("ondulé")), &catalog).unwrap();
        assert_eq!(hit.id, "M2");
    }

    #[test]
    fn test_unresolved_carries_row_text() {
        let catalog = catalog();
        let err = resolve_material(&row(Some("ALU"), None), &catalog).unwrap_err();
        assert_eq!(err.kind, RowErrorKind::Unresolved);
        assert_eq!(err.row_ref, "ALU");
        assert!(err.reason.contains("ALU"));
    }

    #[test]
    fn test_no_identifier_is_error() {
        let catalog = catalog();
        let err = resolve_material(&row(None, None), &catalog).unwrap_err();
        assert_eq!(err.kind, RowErrorKind::Unresolved);
        assert_eq!(err.row_ref, "第2行");
    }

    #[test]
    fn test_empty_catalog() {
        assert!(resolve_material(&row(Some("PET"), Some("PET")), &[]).is_err());
    }
}
