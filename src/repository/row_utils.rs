// ==========================================
// GoatOS 牧场记录系统 - 行解析工具
// ==========================================
// 约定: 行映射闭包返回 rusqlite::Result<Result<T, SkipReason>>
//       外层为数据库错误 (整体失败)，内层为单行数据错误 (跳过该行)
// ==========================================

use crate::domain::SkipReason;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;

/// 单行解析结果
pub type ParsedRow<T> = Result<T, SkipReason>;

/// 收集行解析结果：数据库错误上抛，单行数据错误记 warn 后跳过
pub fn collect_rows<T, I>(table: &str, rows: I) -> RepositoryResult<Vec<T>>
where
    I: Iterator<Item = rusqlite::Result<ParsedRow<T>>>,
{
    let mut items = Vec::new();
    for row in rows {
        match row? {
            Ok(item) => items.push(item),
            Err(reason) => {
                tracing::warn!(table = table, reason = %reason, "存储数据无法解析，已跳过该行");
            }
        }
    }
    Ok(items)
}

/// 单条查询的行解析失败直接报错（不跳过）
pub fn require_parsed<T>(table: &str, row: ParsedRow<T>) -> RepositoryResult<T> {
    row.map_err(|reason| RepositoryError::UnreadableRow {
        table: table.to_string(),
        reason,
    })
}

/// 日期落库格式
pub fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 可空日期落库格式
pub fn opt_date_to_db(date: Option<NaiveDate>) -> Option<String> {
    date.map(date_to_db)
}
