// ==========================================
// GoatOS 牧场记录系统 - 畜群档案 API
// ==========================================
// 职责: 山羊档案、屠宰记录、自定义日历事件
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    parse_date, parse_gender, parse_optional_date, parse_status, require_non_empty,
    require_non_negative,
};
use crate::domain::{FarmEvent, Goat, MeatHarvest};
use crate::repository::{FarmEventRepository, GoatRepository};

/// 山羊录入参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoatInput {
    pub name: String,
    pub breed: String,
    pub gender: String,
    pub birthdate: Option<String>,
    pub approx_age_years: i32,
    pub is_fainting: bool,
    pub dam_id: Option<String>,
    pub sire_id: Option<String>,
    pub bio: String,
}

/// 档案列表行（含派生年龄）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoatSummary {
    pub goat: Goat,
    pub display_age: String,
    pub age_in_days: i64,
}

pub struct HerdApi {
    goat_repo: Arc<GoatRepository>,
    farm_event_repo: Arc<FarmEventRepository>,
}

impl HerdApi {
    pub fn new(goat_repo: Arc<GoatRepository>, farm_event_repo: Arc<FarmEventRepository>) -> Self {
        Self {
            goat_repo,
            farm_event_repo,
        }
    }

    pub fn add_goat(&self, input: &GoatInput) -> ApiResult<Goat> {
        let mut goat = Goat::new(
            require_non_empty("name", &input.name)?,
            input.breed.trim().to_string(),
            parse_gender(&input.gender)?,
        );
        goat.birthdate = parse_optional_date("birthdate", input.birthdate.as_deref())?;
        goat.approx_age_years = input.approx_age_years.max(0);
        goat.is_fainting = input.is_fainting;
        goat.dam_id = input.dam_id.clone().filter(|id| !id.trim().is_empty());
        goat.sire_id = input.sire_id.clone().filter(|id| !id.trim().is_empty());
        goat.bio = input.bio.clone();

        self.goat_repo.insert(&goat)?;
        tracing::info!(goat_id = %goat.goat_id, name = %goat.name, "山羊档案已新增");
        Ok(goat)
    }

    /// 档案列表，附带以 today 计算的年龄
    pub fn list_goats(&self, today: NaiveDate) -> ApiResult<Vec<GoatSummary>> {
        Ok(self
            .goat_repo
            .list_all()?
            .into_iter()
            .map(|goat| GoatSummary {
                display_age: goat.display_age(today),
                age_in_days: goat.age_in_days(today),
                goat,
            })
            .collect())
    }

    pub fn update_status(&self, goat_id: &str, status: &str) -> ApiResult<()> {
        self.goat_repo.update_status(goat_id, parse_status(status)?)?;
        Ok(())
    }

    pub fn delete_goat(&self, goat_id: &str) -> ApiResult<()> {
        self.goat_repo.delete(goat_id)?;
        Ok(())
    }

    /// 记录屠宰数据，返回屠宰率 (%)
    pub fn record_harvest(
        &self,
        goat_id: &str,
        live_weight: f64,
        hanging_weight: f64,
    ) -> ApiResult<f64> {
        if self.goat_repo.find_by_id(goat_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Goat(id={})不存在", goat_id)));
        }
        let harvest = MeatHarvest {
            goat_id: goat_id.to_string(),
            live_weight: require_non_negative("live_weight", live_weight)?,
            hanging_weight: require_non_negative("hanging_weight", hanging_weight)?,
        };
        self.goat_repo.record_harvest(&harvest)?;
        Ok(harvest.yield_percentage())
    }

    pub fn get_harvest(&self, goat_id: &str) -> ApiResult<Option<MeatHarvest>> {
        Ok(self.goat_repo.find_harvest(goat_id)?)
    }

    // ===== 自定义日历事件 =====

    pub fn add_farm_event(
        &self,
        title: &str,
        date: &str,
        end_date: Option<&str>,
        category: &str,
        description: &str,
    ) -> ApiResult<FarmEvent> {
        let event = FarmEvent::new(
            require_non_empty("title", title)?,
            parse_date("date", date)?,
            parse_optional_date("end_date", end_date)?,
            category.trim().to_string(),
            description.to_string(),
        );
        self.farm_event_repo.insert(&event)?;
        Ok(event)
    }

    pub fn delete_farm_event(&self, event_id: &str) -> ApiResult<()> {
        self.farm_event_repo.delete(event_id)?;
        Ok(())
    }
}
