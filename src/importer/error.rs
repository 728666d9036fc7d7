// ==========================================
// 材料价格台账 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 行级错误（未匹配/落库失败）不在此枚举内，
//       它们累积进 ImportReport，不中断导入
// ==========================================

use thiserror::Error;

/// 导入模块错误类型（整批中止）
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误（致命）=====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("文件编码不受支持: {0}（请另存为 UTF-8）")]
    UnsupportedEncoding(String),

    // ===== 前置条件错误（不处理任何行）=====
    #[error("缺少必需列: {0}")]
    MissingRequiredColumn(String),

    #[error("无可用价格来源: {0}")]
    NoPriceSource(String),

    #[error("表头之后没有数据行")]
    NoDataRows,

    #[error("已有导入任务正在执行")]
    ImportInProgress,

    #[error("导入参数无效: {0}")]
    InvalidRequest(String),

    // ===== 外部依赖错误 =====
    #[error("存储访问失败: {0}")]
    StoreError(String),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    #[error("配置快照序列化失败: {0}")]
    ConfigSnapshotError(String),
}

impl ImportError {
    /// 是否为前置条件错误（运行被拒绝，未触碰任何行）
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ImportError::MissingRequiredColumn(_)
                | ImportError::NoPriceSource(_)
                | ImportError::NoDataRows
                | ImportError::ImportInProgress
                | ImportError::InvalidRequest(_)
        )
    }

    /// 是否为输入不可读的致命错误
    pub fn is_fatal_input(&self) -> bool {
        matches!(
            self,
            ImportError::FileNotFound(_)
                | ImportError::UnsupportedFormat(_)
                | ImportError::FileReadError(_)
                | ImportError::ExcelParseError(_)
                | ImportError::CsvParseError(_)
                | ImportError::UnsupportedEncoding(_)
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<RepositoryError>
impl From<crate::repository::RepositoryError> for ImportError {
    fn from(err: crate::repository::RepositoryError) -> Self {
        ImportError::StoreError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(ImportError::NoDataRows.is_precondition());
        assert!(ImportError::MissingRequiredColumn("prix".to_string()).is_precondition());
        assert!(!ImportError::NoDataRows.is_fatal_input());
        assert!(ImportError::CsvParseError("bad".to_string()).is_fatal_input());
        assert!(ImportError::UnsupportedEncoding("prix.csv".to_string()).is_fatal_input());
        assert!(!ImportError::StoreError("down".to_string()).is_precondition());
    }

    #[test]
    fn test_error_message() {
        let err = ImportError::NoPriceSource("未配置任何价格来源".to_string());
        assert!(err.to_string().contains("价格来源"));
    }
}
