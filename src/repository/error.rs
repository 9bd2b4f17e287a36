// ==========================================
// GoatOS 牧场记录系统 - 仓储层错误类型
// ==========================================
// 约定: 按 id 查找的接口自行用 .optional() 判空并返回带实体名的 NotFound；
//       rusqlite 的 QueryReturnedNoRows 不会被猜测成某个实体的缺失
// 约定: 约束失败按 SQLite 扩展错误码分类，不解析错误文本
// ==========================================

use crate::domain::SkipReason;
use rusqlite::ffi;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{entity}(id={id})不存在")]
    NotFound { entity: String, id: String },

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库操作失败: {0}")]
    DatabaseQueryError(String),

    /// 主键/唯一约束冲突（例如同一只山羊重复录入屠宰记录）
    #[error("记录已存在: {0}")]
    DuplicateRecord(String),

    /// 引用的山羊/圈舍/配种记录不存在
    #[error("关联记录不存在: {0}")]
    DanglingReference(String),

    /// 写入前发现的非法字段值
    #[error("字段 {field} 取值无效: {message}")]
    InvalidValue { field: String, message: String },

    /// 单条读取时存储数据无法解析
    #[error("{table} 存储数据无法解析: {reason}")]
    UnreadableRow { table: String, reason: SkipReason },
}

impl RepositoryError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn invalid_value(field: &str, message: impl Into<String>) -> Self {
        RepositoryError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _) => match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
                    RepositoryError::DuplicateRecord(err.to_string())
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    RepositoryError::DanglingReference(err.to_string())
                }
                _ => RepositoryError::DatabaseQueryError(err.to_string()),
            },
            rusqlite::Error::QueryReturnedNoRows => {
                RepositoryError::DatabaseQueryError("单行查询没有返回结果".to_string())
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn herd_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE goat (goat_id TEXT PRIMARY KEY, name TEXT NOT NULL);
             CREATE TABLE heat_observation (
                 observation_id TEXT PRIMARY KEY,
                 goat_id TEXT NOT NULL REFERENCES goat(goat_id)
             );
             INSERT INTO goat VALUES ('g1', 'Daisy');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_duplicate_goat_id_is_duplicate_record() {
        let conn = herd_db();
        let err: RepositoryError = conn
            .execute("INSERT INTO goat VALUES ('g1', 'Clover')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, RepositoryError::DuplicateRecord(_)));
    }

    #[test]
    fn test_missing_goat_reference_is_dangling() {
        let conn = herd_db();
        let err: RepositoryError = conn
            .execute("INSERT INTO heat_observation VALUES ('h1', 'ghost')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, RepositoryError::DanglingReference(_)));
    }

    #[test]
    fn test_no_rows_is_not_guessed_as_missing_entity() {
        let err: RepositoryError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, RepositoryError::DatabaseQueryError(_)));
    }

    #[test]
    fn test_not_found_names_entity_and_id() {
        let err = RepositoryError::not_found("Goat", "g-42");
        assert_eq!(err.to_string(), "Goat(id=g-42)不存在");
    }
}
