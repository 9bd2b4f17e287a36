// ==========================================
// GoatOS 牧场记录系统 - 派生字段公共工具
// ==========================================
// 职责: 派生字段计算失败原因 + 日历日运算
// 红线: 派生值只在读取时计算，从不落库
// ==========================================

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 孕期天数（配种日 → 预产期）
pub const GESTATION_DAYS: u64 = 150;

/// 发情周期天数
pub const HEAT_CYCLE_DAYS: u64 = 21;

/// 最佳配种窗口：发情观察日零点后 36 小时
pub const BREEDING_WINDOW_HOURS: i64 = 36;

/// 周期计划"即将到期"默认窗口
pub const DUE_SOON_DAYS: u64 = 14;

// ==========================================
// SkipReason - 单条记录派生失败原因
// ==========================================
// 单条记录派生失败只跳过该记录，不影响整批计算
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    #[error("日期运算溢出: {0}")]
    DateOverflow(String),

    #[error("无效的间隔天数: {0}")]
    InvalidInterval(i64),

    #[error("无效的库存数量: {0}")]
    InvalidQuantity(String),

    #[error("无效的圈舍容量: {0}")]
    InvalidCapacity(i64),

    #[error("评分超出范围: {0}")]
    ScoreOutOfRange(String),

    #[error("坐标数据无法解析: {0}")]
    MalformedCoordinates(String),

    #[error("存储日期无法解析: field={field}, value={value}")]
    MalformedDate { field: String, value: String },

    #[error("存储枚举值无法识别: field={field}, value={value}")]
    UnknownValue { field: String, value: String },
}

/// 日期加若干自然日，溢出时返回 DateOverflow
pub fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate, SkipReason> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| SkipReason::DateOverflow(format!("{} + {}d", date, days)))
}

/// 日期加有符号天数（间隔来自用户输入，需校验非负）
pub fn add_interval_days(date: NaiveDate, interval_days: i64) -> Result<NaiveDate, SkipReason> {
    if interval_days < 0 {
        return Err(SkipReason::InvalidInterval(interval_days));
    }
    add_days(date, interval_days as u64)
}

/// 窗口上界：today + days，溢出时饱和到最大日期
pub fn window_end(today: NaiveDate, days: u64) -> NaiveDate {
    today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// 窗口下界：today - days，溢出时饱和到最小日期
pub fn window_start(today: NaiveDate, days: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

/// 解析存储的 YYYY-MM-DD 日期
pub fn parse_stored_date(field: &str, value: &str) -> Result<NaiveDate, SkipReason> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| SkipReason::MalformedDate {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// 解析可空的存储日期（空串视为 None）
pub fn parse_optional_date(
    field: &str,
    value: Option<String>,
) -> Result<Option<NaiveDate>, SkipReason> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_stored_date(field, &v).map(Some),
        _ => Ok(None),
    }
}

/// 存储枚举值无法识别
pub fn unknown_value(field: &str, value: &str) -> SkipReason {
    SkipReason::UnknownValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_add_days_crosses_leap_day() {
        assert_eq!(add_days(d(2024, 2, 28), 1).unwrap(), d(2024, 2, 29));
        assert_eq!(add_days(d(2024, 1, 3), GESTATION_DAYS).unwrap(), d(2024, 6, 1));
    }

    #[test]
    fn test_add_days_overflow_is_skip_reason() {
        let err = add_days(NaiveDate::MAX, 1).unwrap_err();
        assert!(matches!(err, SkipReason::DateOverflow(_)));
    }

    #[test]
    fn test_negative_interval_rejected() {
        assert_eq!(
            add_interval_days(d(2024, 1, 1), -5),
            Err(SkipReason::InvalidInterval(-5))
        );
        assert_eq!(add_interval_days(d(2024, 1, 1), 0).unwrap(), d(2024, 1, 1));
    }

    #[test]
    fn test_window_bounds_saturate() {
        assert_eq!(window_end(NaiveDate::MAX, 14), NaiveDate::MAX);
        assert_eq!(window_start(NaiveDate::MIN, 14), NaiveDate::MIN);
        assert_eq!(window_end(d(2024, 6, 1), 14), d(2024, 6, 15));
    }

    #[test]
    fn test_parse_stored_date() {
        assert_eq!(parse_stored_date("date", "2024-06-01").unwrap(), d(2024, 6, 1));
        assert!(matches!(
            parse_stored_date("date", "06/01/2024"),
            Err(SkipReason::MalformedDate { .. })
        ));
    }
}
