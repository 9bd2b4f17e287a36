// ==========================================
// GoatOS 牧场记录系统 - 日常饲养记录领域模型
// ==========================================
// 职责: 个体饲喂记录、挤奶记录、体重记录 + 产奶汇总
// ==========================================

use crate::domain::derivation::window_start;
use crate::domain::types::{FeedType, MilkingTime};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 产奶"近期"统计窗口（天，含起始日）
pub const MILK_RECENT_DAYS: u64 = 30;

// ==========================================
// FeedingLog - 饲喂记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingLog {
    pub log_id: String,
    pub goat_id: String,
    pub date: NaiveDate,
    pub feed_type: FeedType,
    pub amount: String, // 自由文本，例: 1 Scoop, 2 Flakes
    pub notes: String,
}

impl FeedingLog {
    pub fn new(
        goat_id: String,
        date: NaiveDate,
        feed_type: FeedType,
        amount: String,
        notes: String,
    ) -> Self {
        Self {
            log_id: uuid::Uuid::new_v4().to_string(),
            goat_id,
            date,
            feed_type,
            amount,
            notes,
        }
    }
}

// ==========================================
// MilkLog - 挤奶记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilkLog {
    pub log_id: String,
    pub goat_id: String,
    pub date: NaiveDate,
    pub time: MilkingTime,
    pub amount_lbs: f64,
    pub notes: String,
}

impl MilkLog {
    pub fn new(
        goat_id: String,
        date: NaiveDate,
        time: MilkingTime,
        amount_lbs: f64,
        notes: String,
    ) -> Self {
        Self {
            log_id: uuid::Uuid::new_v4().to_string(),
            goat_id,
            date,
            time,
            amount_lbs,
            notes,
        }
    }
}

/// 产奶汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MilkSummary {
    pub total_lbs: f64,
    /// 日期不早于 today - 30 天的记录
    pub recent_lbs: f64,
}

impl MilkSummary {
    pub fn from_logs(today: NaiveDate, logs: &[MilkLog]) -> Self {
        let since = window_start(today, MILK_RECENT_DAYS);
        logs.iter().fold(MilkSummary::default(), |mut acc, log| {
            acc.total_lbs += log.amount_lbs;
            if log.date >= since {
                acc.recent_lbs += log.amount_lbs;
            }
            acc
        })
    }
}

// ==========================================
// WeightLog - 体重记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightLog {
    pub log_id: String,
    pub goat_id: String,
    pub date: NaiveDate,
    pub weight_lbs: f64,
    pub notes: String,
}

impl WeightLog {
    pub fn new(goat_id: String, date: NaiveDate, weight_lbs: f64, notes: String) -> Self {
        Self {
            log_id: uuid::Uuid::new_v4().to_string(),
            goat_id,
            date,
            weight_lbs,
            notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn milk(date: NaiveDate, lbs: f64) -> MilkLog {
        MilkLog::new("g1".to_string(), date, MilkingTime::Morning, lbs, String::new())
    }

    #[test]
    fn test_milk_summary_recent_window_inclusive() {
        let today = d(2024, 6, 30);
        let logs = vec![
            milk(d(2024, 5, 31), 2.0), // today - 30
            milk(d(2024, 5, 30), 3.0),
            milk(d(2024, 6, 30), 1.5),
        ];
        let summary = MilkSummary::from_logs(today, &logs);
        assert_eq!(summary.total_lbs, 6.5);
        assert_eq!(summary.recent_lbs, 3.5);
    }

    #[test]
    fn test_empty_milk_summary() {
        assert_eq!(
            MilkSummary::from_logs(d(2024, 6, 30), &[]),
            MilkSummary::default()
        );
    }
}
