// ==========================================
// 材料价格台账 - 价格对账（纯函数核心）
// ==========================================
// 职责: 原始表格 + 材料目录 + 导入策略 → 行结果序列 / 价格草稿
// 红线: 不做任何 I/O，落库由调用方完成
// 流程: 列识别（每批一次）→ 逐行 解析 → 匹配 → 生成草稿
// ==========================================

use crate::domain::import::{ImportReport, RowError, RowResult};
use crate::domain::material::Material;
use crate::domain::price::PriceRecordDraft;
use crate::importer::column_detector::{detect_columns, ColumnMap, SynonymTable};
use crate::importer::entity_resolver::resolve_material;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawTable;
use crate::importer::header_normalizer::normalize_header;
use crate::importer::row_parser::{parse_row, DropReason, RowParse};
use chrono::NaiveDate;

// ==========================================
// ImportPolicy - 导入策略
// ==========================================
// 所有导入行共用的草稿属性
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPolicy {
    pub price_source_id: String,
    pub currency: String,
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>,
    pub comment: Option<String>,
    pub origin_file: Option<String>,
    pub created_by: String,
    pub synonyms: SynonymTable,
}

// ==========================================
// RowOutcome - 对账后的单行结果（落库前）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPrice {
    pub row_number: usize,
    pub row_ref: String,
    pub draft: PriceRecordDraft,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Dropped(DropReason),
    Unresolved(RowError),
    Ready(PendingPrice),
}

impl RowOutcome {
    /// 假定草稿全部落库成功时的行结果
    pub fn prospective_result(&self) -> RowResult {
        match self {
            RowOutcome::Dropped(_) => RowResult::Dropped,
            RowOutcome::Unresolved(error) => RowResult::Failed(error.clone()),
            RowOutcome::Ready(_) => RowResult::Persisted,
        }
    }
}

/// 识别表格列（粘贴文本使用固定布局）
pub fn detect_table_columns(table: &RawTable, synonyms: &SynonymTable) -> ImportResult<ColumnMap> {
    let columns = match &table.headers {
        Some(headers) => {
            let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
            detect_columns(&normalized, synonyms)
        }
        None => ColumnMap::pasted_text(),
    };
    columns.ensure_required()?;
    Ok(columns)
}

/// 逐行对账（按源顺序输出）
pub fn plan_rows(
    table: &RawTable,
    columns: &ColumnMap,
    catalog: &[Material],
    policy: &ImportPolicy,
) -> Vec<RowOutcome> {
    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, cells)| {
            let row = match parse_row(table.row_number(idx), cells, columns) {
                RowParse::Dropped(reason) => return RowOutcome::Dropped(reason),
                RowParse::Candidate(row) => row,
            };

            match resolve_material(&row, catalog) {
                Ok(material) => RowOutcome::Ready(PendingPrice {
                    row_number: row.row_number,
                    row_ref: row.row_ref(),
                    draft: PriceRecordDraft {
                        material_id: material.id.clone(),
                        price_source_id: policy.price_source_id.clone(),
                        price: row.price,
                        price_min: row.price_min,
                        price_max: row.price_max,
                        currency: policy.currency.clone(),
                        valid_from: policy.valid_from,
                        valid_to: policy.valid_to,
                        comment: policy.comment.clone(),
                        origin_file: policy.origin_file.clone(),
                        created_by: policy.created_by.clone(),
                    },
                }),
                Err(error) => RowOutcome::Unresolved(error),
            }
        })
        .collect()
}

/// 对账: 表格 → (报告, 价格草稿)
///
/// 报告中的成功数为“可落库”的草稿数；未匹配行计为错误；丢弃行不计
pub fn reconcile(
    table: &RawTable,
    catalog: &[Material],
    policy: &ImportPolicy,
) -> ImportResult<(ImportReport, Vec<PriceRecordDraft>)> {
    if !table.has_data_rows() {
        return Err(ImportError::NoDataRows);
    }
    let columns = detect_table_columns(table, &policy.synonyms)?;
    let outcomes = plan_rows(table, &columns, catalog, policy);

    let report = ImportReport::from_results(outcomes.iter().map(RowOutcome::prospective_result));
    let drafts = outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            RowOutcome::Ready(pending) => Some(pending.draft),
            _ => None,
        })
        .collect();

    Ok((report, drafts))
}
