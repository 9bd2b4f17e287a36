// ==========================================
// GoatOS 牧场记录系统 - 提醒/日历 API
// ==========================================
// 职责: 加载记录 → 读取窗口配置 → 调用引擎
// 架构: API 层 → Repository 层 + Engine 层
// ==========================================

use std::sync::Arc;

use crate::api::error::{config_error, ApiResult};
use crate::config::AlertConfigReader;
use crate::engine::{
    build_calendar_feed, kidding_board, parse_today, AlertEngine, AlertInputs, AlertSet,
    CalendarFeed, CalendarInputs, KiddingBoardEntry,
};
use crate::repository::{
    BreedingRepository, FarmEventRepository, GoatRepository, HealthScoreRepository,
    HeatRepository, MedicalRepository, PenRepository, StockRepository,
};

// ==========================================
// AlertApi - 提醒 API
// ==========================================
pub struct AlertApi {
    goat_repo: Arc<GoatRepository>,
    breeding_repo: Arc<BreedingRepository>,
    medical_repo: Arc<MedicalRepository>,
    heat_repo: Arc<HeatRepository>,
    health_score_repo: Arc<HealthScoreRepository>,
    stock_repo: Arc<StockRepository>,
    pen_repo: Arc<PenRepository>,
    farm_event_repo: Arc<FarmEventRepository>,
    config: Arc<dyn AlertConfigReader>,
}

impl AlertApi {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        goat_repo: Arc<GoatRepository>,
        breeding_repo: Arc<BreedingRepository>,
        medical_repo: Arc<MedicalRepository>,
        heat_repo: Arc<HeatRepository>,
        health_score_repo: Arc<HealthScoreRepository>,
        stock_repo: Arc<StockRepository>,
        pen_repo: Arc<PenRepository>,
        farm_event_repo: Arc<FarmEventRepository>,
        config: Arc<dyn AlertConfigReader>,
    ) -> Self {
        Self {
            goat_repo,
            breeding_repo,
            medical_repo,
            heat_repo,
            health_score_repo,
            stock_repo,
            pen_repo,
            farm_event_repo,
            config,
        }
    }

    /// 首页提醒
    ///
    /// # 参数
    /// - today: 当前日期 (YYYY-MM-DD)
    ///
    /// # 返回
    /// - Err(InvalidInput): today 不是合法日期
    pub async fn get_dashboard_alerts(&self, today: &str) -> ApiResult<AlertSet> {
        let today = parse_today(today)?;
        let windows = self.config.get_alert_windows().await.map_err(config_error)?;

        let breeding_events = self.breeding_repo.list_all()?;
        let medical_events = self.medical_repo.list_records()?;
        let schedules = self.medical_repo.list_schedules()?;
        let latest_heats = self.heat_repo.latest_per_doe()?;
        let latest_health_scores = self.health_score_repo.latest_per_goat()?;
        let feed_items = self.stock_repo.list_feed()?;
        let medicines = self.stock_repo.list_medicines()?;
        let pens = self.pen_repo.list_occupancy()?;

        let inputs = AlertInputs {
            breeding_events: &breeding_events,
            medical_events: &medical_events,
            schedules: &schedules,
            latest_heats: &latest_heats,
            latest_health_scores: &latest_health_scores,
            feed_items: &feed_items,
            medicines: &medicines,
            pens: &pens,
        };

        let set = AlertEngine::new(windows).compute_alerts(today, &inputs);
        tracing::info!(
            today = %today,
            total = set.total(),
            skipped = set.skipped.len(),
            "首页提醒已生成"
        );
        Ok(set)
    }

    /// 日历条目
    pub fn get_calendar_feed(&self, today: &str) -> ApiResult<CalendarFeed> {
        let today = parse_today(today)?;

        let goats = self.goat_repo.list_all()?;
        let breeding_events = self.breeding_repo.list_all()?;
        let medical_events = self.medical_repo.list_records()?;
        let schedules = self.medical_repo.list_schedules()?;
        let heats = self.heat_repo.list_all()?;
        let kiddings = self.breeding_repo.list_kiddings()?;
        let farm_events = self.farm_event_repo.list_all()?;

        Ok(build_calendar_feed(
            today,
            &CalendarInputs {
                goats: &goats,
                breeding_events: &breeding_events,
                medical_events: &medical_events,
                schedules: &schedules,
                heats: &heats,
                kiddings: &kiddings,
                farm_events: &farm_events,
            },
        ))
    }

    /// 产羔季看板
    pub fn get_kidding_board(&self, today: &str) -> ApiResult<Vec<KiddingBoardEntry>> {
        let today = parse_today(today)?;
        let events = self.breeding_repo.list_with_due_date()?;
        Ok(kidding_board(today, &events))
    }
}
