// ==========================================
// 材料价格台账 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，将下层错误转换为面向操作员的错误消息
// 红线: 所有错误信息必须包含显式原因
// ==========================================

use crate::engine::LedgerError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 导入错误
    // ==========================================
    /// 前置条件不满足，未处理任何行
    #[error("导入被拒绝: {0}")]
    ImportRejected(String),

    /// 输入不可读或导入过程异常中止
    #[error("文件导入失败: {0}")]
    ImportFailed(String),

    #[error("已有导入任务正在执行")]
    ImportInProgress,

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::CheckConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("检查约束违反: {}", msg))
            }
        }
    }
}

// ==========================================
// 从 LedgerError 转换
// ==========================================
impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            LedgerError::NotFound(id) => ApiError::NotFound(format!("价格记录(id={})不存在", id)),
            LedgerError::Repository(err) => err.into(),
        }
    }
}

// ==========================================
// 从 ImportError 转换（未本地化，供非交互调用方使用）
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        if matches!(err, ImportError::ImportInProgress) {
            ApiError::ImportInProgress
        } else if err.is_precondition() {
            ApiError::ImportRejected(err.to_string())
        } else {
            ApiError::ImportFailed(err.to_string())
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "PriceRecord".to_string(),
            id: "P001".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("PriceRecord"));
                assert!(msg.contains("P001"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError =
            RepositoryError::ForeignKeyViolation("FOREIGN KEY constraint failed".to_string()).into();
        assert!(matches!(api_err, ApiError::BusinessRuleViolation(_)));
    }

    #[test]
    fn test_ledger_error_conversion() {
        let api_err: ApiError = LedgerError::Validation {
            field: "price".to_string(),
            message: "不能为负数: -1".to_string(),
        }
        .into();
        match api_err {
            ApiError::InvalidInput(msg) => assert!(msg.contains("price")),
            _ => panic!("Expected InvalidInput"),
        }
    }

    #[test]
    fn test_import_error_conversion() {
        assert!(matches!(
            ApiError::from(ImportError::NoDataRows),
            ApiError::ImportRejected(_)
        ));
        assert!(matches!(
            ApiError::from(ImportError::ImportInProgress),
            ApiError::ImportInProgress
        ));
        assert!(matches!(
            ApiError::from(ImportError::FileNotFound("a.csv".to_string())),
            ApiError::ImportFailed(_)
        ));
    }
}
