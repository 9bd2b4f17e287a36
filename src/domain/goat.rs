// ==========================================
// GoatOS 牧场记录系统 - 山羊档案领域模型
// ==========================================
// 职责: 山羊档案 + 年龄派生字段
// 对齐: schema goat 表
// ==========================================

use crate::domain::types::{Gender, GoatStatus};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ==========================================
// Goat - 山羊档案
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goat {
    pub goat_id: String,
    pub name: String,
    pub breed: String,
    pub gender: Gender,
    pub status: GoatStatus,
    pub birthdate: Option<NaiveDate>, // 出生日期 (未知时为 None)
    pub approx_age_years: i32,        // 估计年龄 (无出生日期时使用)
    pub is_fainting: bool,
    pub dam_id: Option<String>,  // 母系
    pub sire_id: Option<String>, // 父系
    pub bio: String,
}

impl Goat {
    /// 创建新档案（状态默认健康）
    pub fn new(name: String, breed: String, gender: Gender) -> Self {
        Self {
            goat_id: uuid::Uuid::new_v4().to_string(),
            name,
            breed,
            gender,
            status: GoatStatus::Healthy,
            birthdate: None,
            approx_age_years: 0,
            is_fainting: false,
            dam_id: None,
            sire_id: None,
            bio: String::new(),
        }
    }

    /// 日龄
    ///
    /// 有出生日期时按实际天数计算，否则按估计年龄 * 365 近似
    pub fn age_in_days(&self, today: NaiveDate) -> i64 {
        match self.birthdate {
            Some(birthdate) => (today - birthdate).num_days(),
            None => i64::from(self.approx_age_years) * 365,
        }
    }

    /// 展示用年龄
    ///
    /// # 规则
    /// - 不足 7 天 → "N Days"
    /// - 不足 30 天 → "N Week(s)"
    /// - 不足 365 天 → "N Month(s)[, M Week(s)]"（按 30 天一月）
    /// - 其余 → 周岁（未过生日减一）
    /// - 无出生日期 → "{估计年龄} Years"
    pub fn display_age(&self, today: NaiveDate) -> String {
        let birthdate = match self.birthdate {
            Some(b) => b,
            None => return format!("{} Years", self.approx_age_years),
        };

        // 出生日期晚于今天时按 0 天展示
        let total_days = (today - birthdate).num_days().max(0);

        if total_days < 7 {
            format!("{} Days", total_days)
        } else if total_days < 30 {
            plural(total_days / 7, "Week")
        } else if total_days < 365 {
            let months = total_days / 30;
            let weeks = (total_days % 30) / 7;
            if weeks > 0 {
                format!("{}, {}", plural(months, "Month"), plural(weeks, "Week"))
            } else {
                plural(months, "Month")
            }
        } else {
            let before_birthday =
                (today.month(), today.day()) < (birthdate.month(), birthdate.day());
            let years = today.year() - birthdate.year() - i32::from(before_birthday);
            plural(i64::from(years), "Year")
        }
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn goat_born(birthdate: Option<NaiveDate>) -> Goat {
        let mut goat = Goat::new("Daisy".to_string(), "Nubian".to_string(), Gender::Doe);
        goat.birthdate = birthdate;
        goat.approx_age_years = 3;
        goat
    }

    #[test]
    fn test_display_age_without_birthdate() {
        let goat = goat_born(None);
        assert_eq!(goat.display_age(d(2024, 6, 1)), "3 Years");
        assert_eq!(goat.age_in_days(d(2024, 6, 1)), 3 * 365);
    }

    #[test]
    fn test_display_age_days_and_weeks() {
        let today = d(2024, 6, 1);
        assert_eq!(goat_born(Some(d(2024, 5, 29))).display_age(today), "3 Days");
        assert_eq!(goat_born(Some(d(2024, 5, 25))).display_age(today), "1 Week");
        assert_eq!(goat_born(Some(d(2024, 5, 15))).display_age(today), "2 Weeks");
    }

    #[test]
    fn test_display_age_months_with_weeks() {
        let today = d(2024, 6, 1);
        // 74 天 = 2 个月 + 14 天 → 2 周
        let goat = goat_born(Some(today - chrono::Duration::days(74)));
        assert_eq!(goat.display_age(today), "2 Months, 2 Weeks");
        // 30 天整 → 1 个月
        let goat = goat_born(Some(today - chrono::Duration::days(30)));
        assert_eq!(goat.display_age(today), "1 Month");
    }

    #[test]
    fn test_display_age_years_respects_birthday() {
        let goat = goat_born(Some(d(2021, 6, 2)));
        assert_eq!(goat.display_age(d(2024, 6, 1)), "2 Years");
        assert_eq!(goat.display_age(d(2024, 6, 2)), "3 Years");
        let goat = goat_born(Some(d(2023, 5, 1)));
        assert_eq!(goat.display_age(d(2024, 6, 1)), "1 Year");
    }

    #[test]
    fn test_age_in_days_with_birthdate() {
        let goat = goat_born(Some(d(2024, 5, 1)));
        assert_eq!(goat.age_in_days(d(2024, 6, 1)), 31);
    }
}
