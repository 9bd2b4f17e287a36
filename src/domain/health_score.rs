// ==========================================
// GoatOS 牧场记录系统 - 体况评分领域模型
// ==========================================
// 职责: FAMACHA 贫血评分 (1-5) 与体况评分 BCS (1-5, 0.5 步进)
// 说明: FAMACHA 4/5 表示贫血，需要驱虫
// ==========================================

use crate::domain::derivation::SkipReason;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// FAMACHA 提醒阈值（含）
pub const FAMACHA_ALERT_THRESHOLD: i32 = 4;

pub const FAMACHA_MIN: i32 = 1;
pub const FAMACHA_MAX: i32 = 5;
pub const BCS_MIN: f64 = 1.0;
pub const BCS_MAX: f64 = 5.0;

// ==========================================
// HealthScore - 体况评分记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    pub score_id: String,
    pub goat_id: String,
    pub date: NaiveDate,
    pub famacha_score: Option<i32>,
    pub body_condition_score: Option<f64>,
    pub notes: String,
}

impl HealthScore {
    pub fn new(
        goat_id: String,
        date: NaiveDate,
        famacha_score: Option<i32>,
        body_condition_score: Option<f64>,
        notes: String,
    ) -> Self {
        Self {
            score_id: uuid::Uuid::new_v4().to_string(),
            goat_id,
            date,
            famacha_score,
            body_condition_score,
            notes,
        }
    }

    /// 本次评分是否需要驱虫关注
    ///
    /// 未做 FAMACHA 评分时为 false；存储值超出 1-5 时返回 ScoreOutOfRange
    pub fn needs_deworming(&self) -> Result<bool, SkipReason> {
        match self.famacha_score {
            None => Ok(false),
            Some(score) => Ok(check_famacha(score)? >= FAMACHA_ALERT_THRESHOLD),
        }
    }
}

/// FAMACHA 必须是 1-5 的整数
pub fn check_famacha(score: i32) -> Result<i32, SkipReason> {
    if (FAMACHA_MIN..=FAMACHA_MAX).contains(&score) {
        Ok(score)
    } else {
        Err(SkipReason::ScoreOutOfRange(format!("famacha={}", score)))
    }
}

/// BCS 必须在 1-5 之间且为 0.5 的整数倍
pub fn check_body_condition(score: f64) -> Result<f64, SkipReason> {
    let in_range = score.is_finite() && (BCS_MIN..=BCS_MAX).contains(&score);
    if in_range && (score * 2.0).fract() == 0.0 {
        Ok(score)
    } else {
        Err(SkipReason::ScoreOutOfRange(format!("body_condition={}", score)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(famacha: Option<i32>) -> HealthScore {
        HealthScore::new(
            "g1".to_string(),
            NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            famacha,
            Some(3.0),
            String::new(),
        )
    }

    #[test]
    fn test_needs_deworming_threshold() {
        assert!(!score(None).needs_deworming().unwrap());
        assert!(!score(Some(3)).needs_deworming().unwrap());
        assert!(score(Some(4)).needs_deworming().unwrap());
        assert!(score(Some(5)).needs_deworming().unwrap());
        assert!(matches!(
            score(Some(7)).needs_deworming(),
            Err(SkipReason::ScoreOutOfRange(_))
        ));
    }

    #[test]
    fn test_body_condition_half_steps() {
        assert_eq!(check_body_condition(2.5).unwrap(), 2.5);
        assert_eq!(check_body_condition(5.0).unwrap(), 5.0);
        assert!(check_body_condition(2.25).is_err());
        assert!(check_body_condition(0.5).is_err());
        assert!(check_body_condition(f64::NAN).is_err());
    }
}
