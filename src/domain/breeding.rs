// ==========================================
// GoatOS 牧场记录系统 - 配种与产羔领域模型
// ==========================================
// 红线: 预产期在创建时确定，之后不再重算
// ==========================================

use crate::domain::derivation::{add_days, SkipReason, GESTATION_DAYS};
use crate::domain::types::{BirthType, Presentation};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// BreedingEvent - 配种记录
// ==========================================
// 对齐: schema breeding_event 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedingEvent {
    pub breeding_id: String,
    pub goat_id: String,   // 母羊
    pub mate_name: String, // 配种公羊名称
    pub breeding_date: NaiveDate,
    pub due_date: NaiveDate, // 预产期 (创建时确定)
    pub notes: String,
}

impl BreedingEvent {
    /// 创建配种记录
    ///
    /// # 参数
    /// - `due_date_override`: 人工指定的预产期；为 None 时取配种日 + 150 天
    ///
    /// # 返回
    /// - Err(SkipReason::DateOverflow): 配种日过大导致预产期无法表示
    pub fn new(
        goat_id: String,
        mate_name: String,
        breeding_date: NaiveDate,
        due_date_override: Option<NaiveDate>,
        notes: String,
    ) -> Result<Self, SkipReason> {
        let due_date = match due_date_override {
            Some(d) => d,
            None => projected_due_date(breeding_date)?,
        };

        Ok(Self {
            breeding_id: uuid::Uuid::new_v4().to_string(),
            goat_id,
            mate_name,
            breeding_date,
            due_date,
            notes,
        })
    }

    /// 距预产期天数（负数表示已过预产期）
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }
}

/// 按孕期推算预产期
pub fn projected_due_date(breeding_date: NaiveDate) -> Result<NaiveDate, SkipReason> {
    add_days(breeding_date, GESTATION_DAYS)
}

// ==========================================
// KiddingRecord - 产羔记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KiddingRecord {
    pub kidding_id: String,
    pub breeding_id: Option<String>, // 关联配种记录 (可空)
    pub dam_id: String,
    pub kidding_date: NaiveDate,
    pub num_kids_born: i32,
    pub num_alive: i32,
    pub num_stillborn: i32,
    pub birth_type: BirthType,
    pub presentation: Presentation,
    pub assisted: bool,
    pub complications: String,
    pub notes: String,
}
