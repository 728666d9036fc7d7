// ==========================================
// 材料价格台账 - 领域类型定义
// ==========================================
// 职责: 单元格取值、导入运行状态等基础类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 单元格取值 (Cell Value)
// ==========================================
// 外部表格的单元格只有三种形态: 文本 / 数值 / 空
// 所有字符串与数值之间的转换都走显式函数，不做隐式强转
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// 从原始文本构造（空白文本视为 Empty）
    pub fn from_raw(raw: &str) -> Self {
        if raw.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    /// 是否为空单元格（Empty 或纯空白文本）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(n) => n.is_nan(),
        }
    }

    /// 转为去空白的文本，空值返回 None
    ///
    /// 数值单元格（例如 Excel 里纯数字的物料代码）按整数格式输出
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Number(n) if !n.is_finite() => None,
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
        }
    }

    /// 转为小数，无法解析返回 None
    ///
    /// # 文本规则
    /// - 去除空白（含不间断空格，兼容 "1 250,50" 这类千分位）
    /// - 去除尾部货币符号 €
    /// - 逗号小数点转为点
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(n) => n.is_finite().then_some(*n),
            CellValue::Text(s) => parse_decimal_text(s),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => write!(f, "{}", text),
            None => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::from_raw(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::from_raw(&value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

fn parse_decimal_text(raw: &str) -> Option<f64> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();
    let compact = compact.trim_end_matches('€');
    if compact.is_empty() {
        return None;
    }

    compact
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

// ==========================================
// 导入运行状态 (Import Run State)
// ==========================================
// Idle → Validating → Importing → Completed
// Idle → Validating → Rejected（前置校验失败，未处理任何行）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportRunState {
    Idle,
    Validating,
    Importing,
    Completed,
    Rejected,
}

impl ImportRunState {
    /// 是否处于运行中（新的导入请求需被拒绝）
    pub fn is_running(&self) -> bool {
        matches!(self, ImportRunState::Validating | ImportRunState::Importing)
    }
}

impl fmt::Display for ImportRunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportRunState::Idle => write!(f, "IDLE"),
            ImportRunState::Validating => write!(f, "VALIDATING"),
            ImportRunState::Importing => write!(f, "IMPORTING"),
            ImportRunState::Completed => write!(f, "COMPLETED"),
            ImportRunState::Rejected => write!(f, "REJECTED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::from_raw("   ").is_blank());
        assert!(CellValue::Text("  ".to_string()).is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert!(!CellValue::from_raw("PET").is_blank());
    }

    #[test]
    fn test_cell_as_decimal() {
        assert_eq!(CellValue::from_raw("150.50").as_decimal(), Some(150.5));
        assert_eq!(CellValue::from_raw(" 80,25 ").as_decimal(), Some(80.25));
        assert_eq!(CellValue::from_raw("1 250,50").as_decimal(), Some(1250.5));
        assert_eq!(CellValue::from_raw("42€").as_decimal(), Some(42.0));
        assert_eq!(CellValue::Number(12.0).as_decimal(), Some(12.0));
        assert_eq!(CellValue::from_raw("abc").as_decimal(), None);
        assert_eq!(CellValue::Empty.as_decimal(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_decimal(), None);
    }

    #[test]
    fn test_cell_as_text() {
        assert_eq!(CellValue::from_raw("  PET ").as_text(), Some("PET".to_string()));
        assert_eq!(CellValue::Number(1234.0).as_text(), Some("1234".to_string()));
        assert_eq!(CellValue::Number(12.5).as_text(), Some("12.5".to_string()));
        assert_eq!(CellValue::Empty.as_text(), None);
    }

    #[test]
    fn test_run_state_running() {
        assert!(ImportRunState::Validating.is_running());
        assert!(ImportRunState::Importing.is_running());
        assert!(!ImportRunState::Idle.is_running());
        assert!(!ImportRunState::Completed.is_running());
        assert!(!ImportRunState::Rejected.is_running());
    }
}
