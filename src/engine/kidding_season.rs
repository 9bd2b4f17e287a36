// ==========================================
// GoatOS 牧场记录系统 - 产羔季看板
// ==========================================
// 职责: 近期及即将到来的预产期，按紧急程度分级
// 说明: 与产羔提醒不同，看板保留最近 14 天内已过预产期的记录
// ==========================================

use crate::domain::derivation::window_start;
use crate::domain::BreedingEvent;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 看板回看天数
pub const KIDDING_BOARD_LOOKBACK_DAYS: u64 = 14;

/// 预产紧急程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KiddingUrgency {
    Overdue,  // 已过预产期
    ThisWeek, // 7 天内
    TwoWeeks, // 14 天内
    Later,
}

impl KiddingUrgency {
    pub fn from_days_until(days_until: i64) -> Self {
        match days_until {
            d if d < 0 => KiddingUrgency::Overdue,
            d if d <= 7 => KiddingUrgency::ThisWeek,
            d if d <= 14 => KiddingUrgency::TwoWeeks,
            _ => KiddingUrgency::Later,
        }
    }
}

impl fmt::Display for KiddingUrgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KiddingUrgency::Overdue => "OVERDUE",
            KiddingUrgency::ThisWeek => "THIS_WEEK",
            KiddingUrgency::TwoWeeks => "TWO_WEEKS",
            KiddingUrgency::Later => "LATER",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KiddingBoardEntry {
    pub breeding_id: String,
    pub goat_id: String,
    pub mate_name: String,
    pub breeding_date: NaiveDate,
    pub due_date: NaiveDate,
    pub days_until: i64,
    pub urgency: KiddingUrgency,
}

/// 构建产羔季看板: due_date >= today-14，按预产期升序
pub fn kidding_board(today: NaiveDate, events: &[BreedingEvent]) -> Vec<KiddingBoardEntry> {
    let cutoff = window_start(today, KIDDING_BOARD_LOOKBACK_DAYS);

    let mut entries: Vec<KiddingBoardEntry> = events
        .iter()
        .filter(|e| e.due_date >= cutoff)
        .map(|e| {
            let days_until = e.days_until_due(today);
            KiddingBoardEntry {
                breeding_id: e.breeding_id.clone(),
                goat_id: e.goat_id.clone(),
                mate_name: e.mate_name.clone(),
                breeding_date: e.breeding_date,
                due_date: e.due_date,
                days_until,
                urgency: KiddingUrgency::from_days_until(days_until),
            }
        })
        .collect();

    entries.sort_by_key(|e| e.due_date);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn due(on: NaiveDate) -> BreedingEvent {
        BreedingEvent::new("g1".into(), "Buck".into(), d(2024, 1, 1), Some(on), String::new())
            .unwrap()
    }

    #[test]
    fn test_urgency_thresholds() {
        assert_eq!(KiddingUrgency::from_days_until(-1), KiddingUrgency::Overdue);
        assert_eq!(KiddingUrgency::from_days_until(0), KiddingUrgency::ThisWeek);
        assert_eq!(KiddingUrgency::from_days_until(7), KiddingUrgency::ThisWeek);
        assert_eq!(KiddingUrgency::from_days_until(8), KiddingUrgency::TwoWeeks);
        assert_eq!(KiddingUrgency::from_days_until(14), KiddingUrgency::TwoWeeks);
        assert_eq!(KiddingUrgency::from_days_until(15), KiddingUrgency::Later);
    }

    #[test]
    fn test_board_lookback_and_order() {
        let today = d(2024, 6, 1);
        let events = vec![
            due(d(2024, 7, 1)),
            due(d(2024, 5, 18)),
            due(d(2024, 5, 17)),
            due(d(2024, 6, 3)),
        ];
        let board = kidding_board(today, &events);
        let dates: Vec<_> = board.iter().map(|e| e.due_date).collect();
        assert_eq!(dates, vec![d(2024, 5, 18), d(2024, 6, 3), d(2024, 7, 1)]);
        assert_eq!(board[0].urgency, KiddingUrgency::Overdue);
        assert_eq!(board[0].days_until, -14);
        assert_eq!(board[1].urgency, KiddingUrgency::ThisWeek);
        assert_eq!(board[2].urgency, KiddingUrgency::Later);
    }
}
