// ==========================================
// GoatOS 牧场记录系统 - 健康/繁殖记录 API
// ==========================================
// 职责: 医疗记录、周期计划、发情观察、体况评分、配种与产羔的录入
// 红线: 预产期只在创建配种记录时确定一次
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{check_scores, parse_date, parse_medical_kind, parse_optional_date};
use crate::domain::types::{BirthType, Presentation};
use crate::domain::{
    BreedingEvent, HealthScore, HeatObservation, KiddingRecord, MedicalEvent, RecurringSchedule,
    ScheduleTarget,
};
use crate::repository::{
    BreedingRepository, GoatRepository, HealthScoreRepository, HeatRepository, MedicalRepository,
};

/// 录入医疗记录的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMedicalResponse {
    pub record: MedicalEvent,
    /// 被推进的周期计划数量
    pub schedules_advanced: usize,
}

/// 产羔录入参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KiddingInput {
    pub dam_id: String,
    pub breeding_id: Option<String>,
    pub kidding_date: String,
    pub num_kids_born: i32,
    pub num_alive: i32,
    pub num_stillborn: i32,
    pub birth_type: String,
    pub presentation: String,
    pub assisted: bool,
    pub complications: String,
    pub notes: String,
}

// ==========================================
// HealthApi
// ==========================================
pub struct HealthApi {
    goat_repo: Arc<GoatRepository>,
    medical_repo: Arc<MedicalRepository>,
    heat_repo: Arc<HeatRepository>,
    breeding_repo: Arc<BreedingRepository>,
    health_score_repo: Arc<HealthScoreRepository>,
}

impl HealthApi {
    pub fn new(
        goat_repo: Arc<GoatRepository>,
        medical_repo: Arc<MedicalRepository>,
        heat_repo: Arc<HeatRepository>,
        breeding_repo: Arc<BreedingRepository>,
        health_score_repo: Arc<HealthScoreRepository>,
    ) -> Self {
        Self {
            goat_repo,
            medical_repo,
            heat_repo,
            breeding_repo,
            health_score_repo,
        }
    }

    fn ensure_goat_exists(&self, goat_id: &str) -> ApiResult<()> {
        match self.goat_repo.find_by_id(goat_id)? {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound(format!("Goat(id={})不存在", goat_id))),
        }
    }

    // ===== 医疗 =====

    /// 录入医疗记录，并推进匹配的周期计划
    pub fn record_medical_event(
        &self,
        goat_id: &str,
        performed_date: &str,
        kind: &str,
        notes: &str,
        next_due_date: Option<&str>,
    ) -> ApiResult<RecordMedicalResponse> {
        self.ensure_goat_exists(goat_id)?;
        let performed_date = parse_date("performed_date", performed_date)?;
        let kind = parse_medical_kind(kind)?;
        let next_due_date = parse_optional_date("next_due_date", next_due_date)?;

        let record = MedicalEvent::new(
            goat_id.to_string(),
            performed_date,
            kind,
            notes.to_string(),
            next_due_date,
        );
        let schedules_advanced = self.medical_repo.insert_record(&record)?;

        info!(
            goat_id = %goat_id,
            kind = %kind,
            schedules_advanced = schedules_advanced,
            "医疗记录已录入"
        );
        Ok(RecordMedicalResponse {
            record,
            schedules_advanced,
        })
    }

    /// 新增周期计划
    ///
    /// # 参数
    /// - goat_id: None 表示全群计划
    /// - interval_days: 必须大于 0
    pub fn add_schedule(
        &self,
        goat_id: Option<&str>,
        kind: &str,
        interval_days: i64,
        last_performed: &str,
        notes: &str,
    ) -> ApiResult<RecurringSchedule> {
        if interval_days <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "间隔天数必须大于 0: {}",
                interval_days
            )));
        }
        if let Some(id) = goat_id {
            self.ensure_goat_exists(id)?;
        }

        let schedule = RecurringSchedule::new(
            ScheduleTarget::from_goat_id(goat_id.map(str::to_string)),
            parse_medical_kind(kind)?,
            interval_days,
            parse_date("last_performed", last_performed)?,
            notes.to_string(),
        );
        self.medical_repo.insert_schedule(&schedule)?;
        Ok(schedule)
    }

    pub fn list_schedules(&self) -> ApiResult<Vec<RecurringSchedule>> {
        Ok(self.medical_repo.list_schedules()?)
    }

    // ===== 发情 =====

    pub fn record_heat(
        &self,
        goat_id: &str,
        observed_date: &str,
        signs: &str,
        notes: &str,
    ) -> ApiResult<HeatObservation> {
        self.ensure_goat_exists(goat_id)?;
        let obs = HeatObservation::new(
            goat_id.to_string(),
            parse_date("observed_date", observed_date)?,
            signs.to_string(),
            notes.to_string(),
        );
        self.heat_repo.insert(&obs)?;
        Ok(obs)
    }

    // ===== 体况评分 =====

    /// 录入 FAMACHA / BCS 评分
    ///
    /// # 参数
    /// - famacha: 1-5 的整数，可不填
    /// - body_condition: 1-5 且为 0.5 的倍数，可不填
    ///
    /// # 返回
    /// - Err(InvalidInput): 两项都未填写，或任一项超出范围
    pub fn record_health_score(
        &self,
        goat_id: &str,
        date: &str,
        famacha: Option<i32>,
        body_condition: Option<f64>,
        notes: &str,
    ) -> ApiResult<HealthScore> {
        self.ensure_goat_exists(goat_id)?;
        if famacha.is_none() && body_condition.is_none() {
            return Err(ApiError::InvalidInput(
                "FAMACHA 与体况评分至少填写一项".to_string(),
            ));
        }
        check_scores(famacha, body_condition)?;

        let score = HealthScore::new(
            goat_id.to_string(),
            parse_date("date", date)?,
            famacha,
            body_condition,
            notes.to_string(),
        );
        self.health_score_repo.insert(&score)?;
        info!(goat_id = %goat_id, famacha = ?famacha, "体况评分已录入");
        Ok(score)
    }

    /// 某只山羊的评分历史（最近在前）
    pub fn list_health_scores(&self, goat_id: &str) -> ApiResult<Vec<HealthScore>> {
        Ok(self.health_score_repo.list_by_goat(goat_id)?)
    }

    pub fn delete_health_score(&self, score_id: &str) -> ApiResult<()> {
        Ok(self.health_score_repo.delete(score_id)?)
    }

    // ===== 配种/产羔 =====

    /// 录入配种记录
    ///
    /// # 参数
    /// - due_date_override: 人工指定预产期；未填写时取配种日 + 150 天
    pub fn record_breeding(
        &self,
        goat_id: &str,
        mate_name: &str,
        breeding_date: &str,
        due_date_override: Option<&str>,
        notes: &str,
    ) -> ApiResult<BreedingEvent> {
        self.ensure_goat_exists(goat_id)?;
        let breeding_date = parse_date("breeding_date", breeding_date)?;
        let due_override = parse_optional_date("due_date", due_date_override)?;

        let event = BreedingEvent::new(
            goat_id.to_string(),
            mate_name.trim().to_string(),
            breeding_date,
            due_override,
            notes.to_string(),
        )
        .map_err(|reason| ApiError::InvalidInput(reason.to_string()))?;

        self.breeding_repo.insert(&event)?;
        info!(goat_id = %goat_id, due_date = %event.due_date, "配种记录已录入");
        Ok(event)
    }

    /// 录入产羔记录
    pub fn record_kidding(&self, input: &KiddingInput) -> ApiResult<KiddingRecord> {
        self.ensure_goat_exists(&input.dam_id)?;
        if input.num_kids_born < 0 || input.num_alive < 0 || input.num_stillborn < 0 {
            return Err(ApiError::InvalidInput("产羔数量不能为负数".to_string()));
        }
        let accounted = input
            .num_alive
            .checked_add(input.num_stillborn)
            .ok_or_else(|| {
                ApiError::InvalidInput(format!(
                    "存活数 {} + 死胎数 {} 超出可记录范围",
                    input.num_alive, input.num_stillborn
                ))
            })?;
        if accounted > input.num_kids_born {
            return Err(ApiError::InvalidInput(format!(
                "存活数 {} + 死胎数 {} 超过产羔总数 {}",
                input.num_alive, input.num_stillborn, input.num_kids_born
            )));
        }

        let record = KiddingRecord {
            kidding_id: uuid::Uuid::new_v4().to_string(),
            breeding_id: input.breeding_id.clone().filter(|id| !id.trim().is_empty()),
            dam_id: input.dam_id.clone(),
            kidding_date: parse_date("kidding_date", &input.kidding_date)?,
            num_kids_born: input.num_kids_born,
            num_alive: input.num_alive,
            num_stillborn: input.num_stillborn,
            birth_type: BirthType::from_db_str(&input.birth_type),
            presentation: Presentation::from_db_str(&input.presentation),
            assisted: input.assisted,
            complications: input.complications.clone(),
            notes: input.notes.clone(),
        };
        self.breeding_repo.insert_kidding(&record)?;
        Ok(record)
    }
}
