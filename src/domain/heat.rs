// ==========================================
// GoatOS 牧场记录系统 - 发情观察领域模型
// ==========================================

use crate::domain::derivation::{add_days, SkipReason, BREEDING_WINDOW_HOURS, HEAT_CYCLE_DAYS};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// HeatObservation - 发情观察
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatObservation {
    pub observation_id: String,
    pub goat_id: String,
    pub observed_date: NaiveDate,
    pub signs: String, // 例: flagging, mounting
    pub notes: String,
}

impl HeatObservation {
    pub fn new(goat_id: String, observed_date: NaiveDate, signs: String, notes: String) -> Self {
        Self {
            observation_id: uuid::Uuid::new_v4().to_string(),
            goat_id,
            observed_date,
            signs,
            notes,
        }
    }

    /// 预测下次发情日 = 观察日 + 21 天
    pub fn next_cycle_date(&self) -> Result<NaiveDate, SkipReason> {
        add_days(self.observed_date, HEAT_CYCLE_DAYS)
    }

    /// 最佳配种窗口结束时刻 = 观察日零点 + 36 小时
    ///
    /// 唯一使用小时粒度的派生值，不取整到天
    pub fn breeding_window_end(&self) -> Result<NaiveDateTime, SkipReason> {
        self.observed_date
            .and_hms_opt(0, 0, 0)
            .and_then(|start| start.checked_add_signed(Duration::hours(BREEDING_WINDOW_HOURS)))
            .ok_or_else(|| {
                SkipReason::DateOverflow(format!(
                    "{} + {}h",
                    self.observed_date, BREEDING_WINDOW_HOURS
                ))
            })
    }
}
