// ==========================================
// GoatOS 牧场记录系统 - 医疗记录与周期计划领域模型
// ==========================================
// 职责: 医疗记录 (下次到期由用户填写) + 周期计划 (下次到期派生)
// 红线: 周期计划的 next_due 只在读取时计算
// ==========================================

use crate::domain::derivation::{add_interval_days, window_end, SkipReason, DUE_SOON_DAYS};
use crate::domain::types::MedicalKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// MedicalEvent - 医疗记录
// ==========================================
// 对齐: schema medical_record 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalEvent {
    pub record_id: String,
    pub goat_id: String,
    pub performed_date: NaiveDate,
    pub kind: MedicalKind,
    pub notes: String,
    pub next_due_date: Option<NaiveDate>, // 用户填写，不派生
}

impl MedicalEvent {
    pub fn new(
        goat_id: String,
        performed_date: NaiveDate,
        kind: MedicalKind,
        notes: String,
        next_due_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            record_id: uuid::Uuid::new_v4().to_string(),
            goat_id,
            performed_date,
            kind,
            notes,
            next_due_date,
        }
    }
}

// ==========================================
// ScheduleTarget - 周期计划作用对象
// ==========================================
// 全群计划不按个体展开，由调用方决定如何展示
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleTarget {
    HerdWide,
    ForSubject { goat_id: String },
}

impl ScheduleTarget {
    /// 从可空外键构造
    pub fn from_goat_id(goat_id: Option<String>) -> Self {
        match goat_id {
            Some(id) => ScheduleTarget::ForSubject { goat_id: id },
            None => ScheduleTarget::HerdWide,
        }
    }

    /// 转换为可空外键（落库用）
    pub fn goat_id(&self) -> Option<&str> {
        match self {
            ScheduleTarget::HerdWide => None,
            ScheduleTarget::ForSubject { goat_id } => Some(goat_id.as_str()),
        }
    }

    /// 该计划是否覆盖指定山羊
    pub fn applies_to(&self, goat_id: &str) -> bool {
        match self {
            ScheduleTarget::HerdWide => true,
            ScheduleTarget::ForSubject { goat_id: id } => id == goat_id,
        }
    }
}

// ==========================================
// RecurringSchedule - 周期医疗计划
// ==========================================
// 例: 每 56 天驱虫一次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringSchedule {
    pub schedule_id: String,
    pub target: ScheduleTarget,
    pub kind: MedicalKind,
    pub interval_days: i64,
    pub last_performed: NaiveDate,
    pub notes: String,
}

impl RecurringSchedule {
    pub fn new(
        target: ScheduleTarget,
        kind: MedicalKind,
        interval_days: i64,
        last_performed: NaiveDate,
        notes: String,
    ) -> Self {
        Self {
            schedule_id: uuid::Uuid::new_v4().to_string(),
            target,
            kind,
            interval_days,
            last_performed,
            notes,
        }
    }

    /// 下次到期日 = 上次执行日 + 间隔天数
    pub fn next_due(&self) -> Result<NaiveDate, SkipReason> {
        add_interval_days(self.last_performed, self.interval_days)
    }

    /// 是否即将到期（默认 14 天窗口，含已逾期）
    pub fn is_due_soon(&self, today: NaiveDate) -> Result<bool, SkipReason> {
        self.is_due_within(today, DUE_SOON_DAYS)
    }

    /// 是否在指定窗口内到期: next_due <= today + window_days
    pub fn is_due_within(&self, today: NaiveDate, window_days: u64) -> Result<bool, SkipReason> {
        Ok(self.next_due()? <= window_end(today, window_days))
    }

    /// 医疗记录是否应推进此计划（类型相同且覆盖该山羊）
    pub fn is_advanced_by(&self, event: &MedicalEvent) -> bool {
        self.kind == event.kind && self.target.applies_to(&event.goat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn deworm_schedule(target: ScheduleTarget, last: NaiveDate) -> RecurringSchedule {
        RecurringSchedule::new(target, MedicalKind::Deworm, 56, last, String::new())
    }

    #[test]
    fn test_next_due_and_due_soon() {
        let s = deworm_schedule(ScheduleTarget::HerdWide, d(2024, 4, 10));
        assert_eq!(s.next_due().unwrap(), d(2024, 6, 5));
        assert!(s.is_due_soon(d(2024, 6, 1)).unwrap());
    }

    #[test]
    fn test_due_soon_boundary() {
        let s = deworm_schedule(ScheduleTarget::HerdWide, d(2024, 4, 10));
        // next_due = 06-05；today+14 = 06-05 → 包含
        assert!(s.is_due_soon(d(2024, 5, 22)).unwrap());
        // today+14 = 06-04 → 不包含
        assert!(!s.is_due_soon(d(2024, 5, 21)).unwrap());
    }

    #[test]
    fn test_negative_interval_is_skip() {
        let mut s = deworm_schedule(ScheduleTarget::HerdWide, d(2024, 4, 10));
        s.interval_days = -1;
        assert_eq!(s.next_due(), Err(SkipReason::InvalidInterval(-1)));
    }

    #[test]
    fn test_target_applies_to() {
        let herd = ScheduleTarget::from_goat_id(None);
        let single = ScheduleTarget::from_goat_id(Some("g1".to_string()));
        assert!(herd.applies_to("anyone"));
        assert!(single.applies_to("g1"));
        assert!(!single.applies_to("g2"));
        assert_eq!(single.goat_id(), Some("g1"));
        assert_eq!(herd.goat_id(), None);
    }

    #[test]
    fn test_is_advanced_by_matches_kind_and_target() {
        let s = deworm_schedule(
            ScheduleTarget::ForSubject { goat_id: "g1".to_string() },
            d(2024, 4, 10),
        );
        let event = |goat: &str, kind| {
            MedicalEvent::new(goat.into(), d(2024, 6, 1), kind, String::new(), None)
        };
        let same = event("g1", MedicalKind::Deworm);
        let other_goat = event("g2", MedicalKind::Deworm);
        let other_kind = event("g1", MedicalKind::Hoof);
        assert!(s.is_advanced_by(&same));
        assert!(!s.is_advanced_by(&other_goat));
        assert!(!s.is_advanced_by(&other_kind));
    }
}
