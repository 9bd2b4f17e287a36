// ==========================================
// GoatOS 牧场记录系统 - 引擎层错误类型
// ==========================================
// 说明: 单条记录派生失败不是错误 (见 SkipReason)，
//       只有调用约定被破坏时才整体失败
// ==========================================

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlertError {
    /// today 不是合法日历日期
    #[error("无效的当前日期: {0}")]
    InvalidToday(String),
}

/// 解析调用方传入的当前日期（YYYY-MM-DD）
pub fn parse_today(today: &str) -> Result<NaiveDate, AlertError> {
    NaiveDate::parse_from_str(today.trim(), "%Y-%m-%d")
        .map_err(|e| AlertError::InvalidToday(format!("{} ({})", today, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_today() {
        assert_eq!(
            parse_today("2024-06-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert!(matches!(parse_today("2024-02-30"), Err(AlertError::InvalidToday(_))));
        assert!(matches!(parse_today(""), Err(AlertError::InvalidToday(_))));
    }
}
