// ==========================================
// 材料价格台账 - 导入领域模型
// ==========================================
// 职责: 导入行、行级错误、导入报告（均为临时对象，不落库）
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认的逐行错误展示上限（超过后仅展示汇总数）
pub const DEFAULT_ERROR_DETAIL_LIMIT: usize = 10;

// ==========================================
// ImportRow - 候选导入行
// ==========================================
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    pub row_number: usize, // 源表中的行号（表头为第 1 行）
    pub abbreviation: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl ImportRow {
    /// 行的可识别文本（用于错误报告）
    pub fn row_ref(&self) -> String {
        self.abbreviation
            .clone()
            .or_else(|| self.description.clone())
            .unwrap_or_else(|| format!("第{}行", self.row_number))
    }
}

// ==========================================
// RowError - 行级错误
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowErrorKind {
    Unresolved, // 未匹配到目录材料
    Persist,    // 存储层拒绝或失败
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row_number: usize,
    pub row_ref: String,
    pub kind: RowErrorKind,
    pub reason: String,
}

// ==========================================
// RowResult - 单行最终结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RowResult {
    Dropped,
    Persisted,
    Failed(RowError),
}

// ==========================================
// ImportStatus - 导入结论
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
    Succeeded,          // 全部成功
    PartiallySucceeded, // 有成功也有错误
    Failed,             // 无成功且有错误
    Empty,              // 无成功也无错误（全部被静默丢弃）
}

// ==========================================
// ImportReport - 导入报告
// ==========================================
// 由行结果序列折叠得到，不在迭代中原地修改计数器
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    /// 吸收一行结果，返回新的报告
    pub fn absorb(self, result: RowResult) -> Self {
        match result {
            RowResult::Dropped => self,
            RowResult::Persisted => Self {
                success_count: self.success_count + 1,
                ..self
            },
            RowResult::Failed(error) => {
                let mut errors = self.errors;
                errors.push(error);
                Self {
                    success_count: self.success_count,
                    error_count: self.error_count + 1,
                    errors,
                }
            }
        }
    }

    /// 折叠一组行结果
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = RowResult>,
    {
        results
            .into_iter()
            .fold(ImportReport::default(), ImportReport::absorb)
    }

    pub fn status(&self) -> ImportStatus {
        match (self.success_count, self.error_count) {
            (0, 0) => ImportStatus::Empty,
            (0, _) => ImportStatus::Failed,
            (_, 0) => ImportStatus::Succeeded,
            _ => ImportStatus::PartiallySucceeded,
        }
    }

    /// 有记录落库时，依赖方需要刷新
    pub fn should_refresh(&self) -> bool {
        self.success_count > 0
    }

    /// 逐行错误明细（错误数超过上限时不展示）
    pub fn visible_errors(&self, limit: usize) -> Option<&[RowError]> {
        if self.error_count <= limit {
            Some(&self.errors)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unresolved(row_number: usize, row_ref: &str) -> RowResult {
        RowResult::Failed(RowError {
            row_number,
            row_ref: row_ref.to_string(),
            kind: RowErrorKind::Unresolved,
            reason: "未匹配".to_string(),
        })
    }

    #[test]
    fn test_report_fold_counts() {
        let report = ImportReport::from_results(vec![
            RowResult::Persisted,
            RowResult::Dropped,
            unresolved(4, "PET"),
            RowResult::Persisted,
        ]);

        assert_eq!(report.success_count, 2);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.errors[0].row_ref, "PET");
        assert_eq!(report.status(), ImportStatus::PartiallySucceeded);
        assert!(report.should_refresh());
    }

    #[test]
    fn test_report_drops_change_nothing() {
        let report = ImportReport::from_results(vec![RowResult::Dropped, RowResult::Dropped]);
        assert_eq!(report, ImportReport::default());
        assert_eq!(report.status(), ImportStatus::Empty);
        assert!(!report.should_refresh());
    }

    #[test]
    fn test_report_failed_when_nothing_persisted() {
        let report = ImportReport::from_results(vec![unresolved(2, "PET")]);
        assert_eq!(report.status(), ImportStatus::Failed);
        assert!(!report.should_refresh());
    }

    #[test]
    fn test_visible_errors_limit() {
        let results: Vec<RowResult> = (0..11).map(|i| unresolved(i + 2, "X")).collect();
        let report = ImportReport::from_results(results);

        assert_eq!(report.error_count, 11);
        assert!(report.visible_errors(DEFAULT_ERROR_DETAIL_LIMIT).is_none());

        let report = ImportReport::from_results((0..10).map(|i| unresolved(i + 2, "X")));
        assert_eq!(report.visible_errors(DEFAULT_ERROR_DETAIL_LIMIT).map(|e| e.len()), Some(10));
    }

    #[test]
    fn test_row_ref_fallback() {
        let row = ImportRow {
            row_number: 7,
            abbreviation: None,
            description: None,
            price: 1.0,
            price_min: None,
            price_max: None,
        };
        assert_eq!(row.row_ref(), "第7行");

        let row = ImportRow {
            description: Some("Carton ondulé".to_string()),
            ..row
        };
        assert_eq!(row.row_ref(), "Carton ondulé");
    }
}
