// ==========================================
// 材料价格台账 - 行解析与校验
// ==========================================
// 职责: 单行原始单元格 → 候选导入行，或静默丢弃
// 规则:
// - 全空行: 静默丢弃
// - 价格缺失/非数值/<=0: 静默丢弃
// - 最低价/最高价: 仅在存在且为数值时解析，否则视为缺失
// - 简称/描述: 可选，去空白；两者皆空的行交由实体匹配报错
// ==========================================

use crate::domain::import::ImportRow;
use crate::domain::types::CellValue;
use crate::importer::column_detector::{ColumnMap, PriceField};

/// 丢弃原因（不计入报告）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Blank,
    InvalidPrice,
}

/// 行解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum RowParse {
    Dropped(DropReason),
    Candidate(ImportRow),
}

/// 解析单行
///
/// # 参数
/// - row_number: 源表行号（用于报告定位）
/// - cells: 行内单元格
/// - columns: 列识别结果
pub fn parse_row(row_number: usize, cells: &[CellValue], columns: &ColumnMap) -> RowParse {
    if cells.iter().all(CellValue::is_blank) {
        return RowParse::Dropped(DropReason::Blank);
    }

    let cell = |field: PriceField| columns.get(field).and_then(|idx| cells.get(idx));

    let price = match cell(PriceField::Price).and_then(CellValue::as_decimal) {
        Some(p) if p > 0.0 => p,
        _ => return RowParse::Dropped(DropReason::InvalidPrice),
    };

    RowParse::Candidate(ImportRow {
        row_number,
        abbreviation: cell(PriceField::Abbreviation).and_then(CellValue::as_text),
        description: cell(PriceField::Description).and_then(CellValue::as_text),
        price,
        price_min: cell(PriceField::PriceMin).and_then(CellValue::as_decimal),
        price_max: cell(PriceField::PriceMax).and_then(CellValue::as_decimal),
    })
}
