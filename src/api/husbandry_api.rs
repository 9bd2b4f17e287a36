// ==========================================
// GoatOS 牧场记录系统 - 日常饲养 API
// ==========================================
// 职责: 个体饲喂、挤奶、体重记录
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{parse_date, parse_milking_time, require_non_negative};
use crate::domain::types::FeedType;
use crate::domain::{FeedingLog, MilkLog, MilkSummary, WeightLog};
use crate::repository::{GoatRepository, HusbandryRepository};

/// 体重概览默认条数
pub const RECENT_WEIGHT_LIMIT: u32 = 20;

pub struct HusbandryApi {
    goat_repo: Arc<GoatRepository>,
    husbandry_repo: Arc<HusbandryRepository>,
}

impl HusbandryApi {
    pub fn new(goat_repo: Arc<GoatRepository>, husbandry_repo: Arc<HusbandryRepository>) -> Self {
        Self {
            goat_repo,
            husbandry_repo,
        }
    }

    fn ensure_goat_exists(&self, goat_id: &str) -> ApiResult<()> {
        match self.goat_repo.find_by_id(goat_id)? {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound(format!("Goat(id={})不存在", goat_id))),
        }
    }

    // ===== 饲喂 =====

    /// 录入个体饲喂；饲料类型未知时归为 Other
    pub fn add_feeding(
        &self,
        goat_id: &str,
        date: &str,
        feed_type: &str,
        amount: &str,
        notes: &str,
    ) -> ApiResult<FeedingLog> {
        self.ensure_goat_exists(goat_id)?;
        let log = FeedingLog::new(
            goat_id.to_string(),
            parse_date("date", date)?,
            FeedType::from_db_str(feed_type),
            amount.trim().to_string(),
            notes.to_string(),
        );
        self.husbandry_repo.insert_feeding(&log)?;
        Ok(log)
    }

    pub fn list_feeding(&self, goat_id: &str) -> ApiResult<Vec<FeedingLog>> {
        Ok(self.husbandry_repo.list_feeding_by_goat(goat_id)?)
    }

    pub fn delete_feeding(&self, log_id: &str) -> ApiResult<()> {
        Ok(self.husbandry_repo.delete_feeding(log_id)?)
    }

    // ===== 挤奶 =====

    /// 录入挤奶记录
    ///
    /// # 参数
    /// - time: AM / PM
    /// - amount_lbs: 非负
    pub fn add_milk(
        &self,
        goat_id: &str,
        date: &str,
        time: &str,
        amount_lbs: f64,
        notes: &str,
    ) -> ApiResult<MilkLog> {
        self.ensure_goat_exists(goat_id)?;
        let log = MilkLog::new(
            goat_id.to_string(),
            parse_date("date", date)?,
            parse_milking_time(time)?,
            require_non_negative("amount_lbs", amount_lbs)?,
            notes.to_string(),
        );
        self.husbandry_repo.insert_milk(&log)?;
        Ok(log)
    }

    pub fn list_milk(&self) -> ApiResult<Vec<MilkLog>> {
        Ok(self.husbandry_repo.list_milk()?)
    }

    /// 累计产奶量与近 30 天产奶量
    pub fn milk_summary(&self, today: NaiveDate) -> ApiResult<MilkSummary> {
        let logs = self.husbandry_repo.list_milk()?;
        Ok(MilkSummary::from_logs(today, &logs))
    }

    pub fn delete_milk(&self, log_id: &str) -> ApiResult<()> {
        Ok(self.husbandry_repo.delete_milk(log_id)?)
    }

    // ===== 体重 =====

    pub fn add_weight(
        &self,
        goat_id: &str,
        date: &str,
        weight_lbs: f64,
        notes: &str,
    ) -> ApiResult<WeightLog> {
        self.ensure_goat_exists(goat_id)?;
        if weight_lbs == 0.0 {
            return Err(ApiError::InvalidInput("体重必须大于 0".to_string()));
        }
        let log = WeightLog::new(
            goat_id.to_string(),
            parse_date("date", date)?,
            require_non_negative("weight_lbs", weight_lbs)?,
            notes.to_string(),
        );
        self.husbandry_repo.insert_weight(&log)?;
        Ok(log)
    }

    /// 体重曲线（日期升序）
    pub fn list_weights(&self, goat_id: &str) -> ApiResult<Vec<WeightLog>> {
        Ok(self.husbandry_repo.list_weights_by_goat(goat_id)?)
    }

    /// 全群最近的体重记录
    pub fn recent_weights(&self) -> ApiResult<Vec<WeightLog>> {
        Ok(self.husbandry_repo.list_recent_weights(RECENT_WEIGHT_LIMIT)?)
    }

    pub fn delete_weight(&self, log_id: &str) -> ApiResult<()> {
        Ok(self.husbandry_repo.delete_weight(log_id)?)
    }
}
