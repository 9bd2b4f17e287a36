// ==========================================
// GoatOS 牧场记录系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/引擎错误为用户可读的错误消息
// ==========================================

use crate::engine::AlertError;
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

    #[error("PIN 校验失败")]
    Unauthorized,

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导出错误
    // ==========================================
    #[error("导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            err @ RepositoryError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::DuplicateRecord(msg) => {
                ApiError::BusinessRuleViolation(format!("记录已存在: {}", msg))
            }
            RepositoryError::DanglingReference(msg) => {
                ApiError::NotFound(format!("关联记录不存在: {}", msg))
            }
            err @ RepositoryError::InvalidValue { .. } => ApiError::InvalidInput(err.to_string()),
            err @ RepositoryError::UnreadableRow { .. } => ApiError::DatabaseError(err.to_string()),
        }
    }
}

// ==========================================
// 从引擎错误转换
// ==========================================
impl From<AlertError> for ApiError {
    fn from(err: AlertError) -> Self {
        match err {
            AlertError::InvalidToday(msg) => {
                ApiError::InvalidInput(format!("无效的当前日期: {}", msg))
            }
        }
    }
}

/// 配置层错误统一按内部错误处理
pub(crate) fn config_error(err: Box<dyn std::error::Error + Send + Sync>) -> ApiError {
    ApiError::InternalError(format!("配置读取失败: {}", err))
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::not_found("Goat", "G001").into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Goat"));
                assert!(msg.contains("G001"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError = RepositoryError::DuplicateRecord("goat_id".into()).into();
        assert!(matches!(api_err, ApiError::BusinessRuleViolation(_)));

        let api_err: ApiError = RepositoryError::invalid_value("end_date", "早于开始日期").into();
        assert!(matches!(api_err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_alert_error_is_invalid_input() {
        let api_err: ApiError = AlertError::InvalidToday("2024-13-01".into()).into();
        assert!(matches!(api_err, ApiError::InvalidInput(_)));
    }
}
