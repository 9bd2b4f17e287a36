// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

#![allow(dead_code)]

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::Arc;

use tempfile::NamedTempFile;

use goatos::api::{
    AlertApi, BarnApi, ExportApi, FinanceApi, GoatInput, HealthApi, HerdApi, HusbandryApi,
};
use goatos::config::{AlertConfigReader, ConfigManager};
use goatos::domain::Goat;
use goatos::repository::{
    BreedingRepository, FarmEventRepository, FinanceRepository, GoatRepository,
    HealthScoreRepository, HeatRepository, HusbandryRepository, MedicalRepository,
    PastureRepository, PenRepository, StockRepository,
};

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含所有API实例和必要的依赖
pub struct ApiTestEnv {
    pub db_path: String,
    pub alert_api: Arc<AlertApi>,
    pub health_api: Arc<HealthApi>,
    pub barn_api: Arc<BarnApi>,
    pub herd_api: Arc<HerdApi>,
    pub finance_api: Arc<FinanceApi>,
    pub husbandry_api: Arc<HusbandryApi>,
    pub export_api: Arc<ExportApi>,
    pub config_manager: Arc<ConfigManager>,

    // Repository层（用于测试数据准备）
    pub goat_repo: Arc<GoatRepository>,
    pub stock_repo: Arc<StockRepository>,
    pub pen_repo: Arc<PenRepository>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的测试环境
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let (temp_file, db_path) = test_helpers::create_test_db()?;
        let conn = test_helpers::shared_connection(&db_path)?;

        let goat_repo = Arc::new(GoatRepository::from_connection(conn.clone()));
        let breeding_repo = Arc::new(BreedingRepository::from_connection(conn.clone()));
        let medical_repo = Arc::new(MedicalRepository::from_connection(conn.clone()));
        let heat_repo = Arc::new(HeatRepository::from_connection(conn.clone()));
        let stock_repo = Arc::new(StockRepository::from_connection(conn.clone()));
        let pen_repo = Arc::new(PenRepository::from_connection(conn.clone()));
        let pasture_repo = Arc::new(PastureRepository::from_connection(conn.clone()));
        let farm_event_repo = Arc::new(FarmEventRepository::from_connection(conn.clone()));
        let health_score_repo = Arc::new(HealthScoreRepository::from_connection(conn.clone()));
        let finance_repo = Arc::new(FinanceRepository::from_connection(conn.clone()));
        let husbandry_repo = Arc::new(HusbandryRepository::from_connection(conn.clone()));

        let config_manager =
            Arc::new(ConfigManager::from_connection(conn).map_err(|e| e.to_string())?);
        let config_reader: Arc<dyn AlertConfigReader> = config_manager.clone();

        let alert_api = Arc::new(AlertApi::new(
            goat_repo.clone(),
            breeding_repo.clone(),
            medical_repo.clone(),
            heat_repo.clone(),
            health_score_repo.clone(),
            stock_repo.clone(),
            pen_repo.clone(),
            farm_event_repo.clone(),
            config_reader,
        ));
        let health_api = Arc::new(HealthApi::new(
            goat_repo.clone(),
            medical_repo.clone(),
            heat_repo,
            breeding_repo,
            health_score_repo,
        ));
        let barn_api = Arc::new(BarnApi::new(
            goat_repo.clone(),
            pen_repo.clone(),
            stock_repo.clone(),
            pasture_repo.clone(),
        ));
        let herd_api = Arc::new(HerdApi::new(goat_repo.clone(), farm_event_repo));
        let finance_api = Arc::new(FinanceApi::new(goat_repo.clone(), finance_repo.clone()));
        let husbandry_api = Arc::new(HusbandryApi::new(goat_repo.clone(), husbandry_repo.clone()));
        let export_api = Arc::new(ExportApi::new(
            goat_repo.clone(),
            medical_repo,
            pasture_repo,
            finance_repo,
            husbandry_repo,
        ));

        Ok(Self {
            db_path,
            alert_api,
            health_api,
            barn_api,
            herd_api,
            finance_api,
            husbandry_api,
            export_api,
            config_manager,
            goat_repo,
            stock_repo,
            pen_repo,
            _temp_file: temp_file,
        })
    }

    /// 录入一只山羊
    pub fn add_goat(&self, name: &str, gender: &str) -> Goat {
        self.herd_api
            .add_goat(&GoatInput {
                name: name.to_string(),
                breed: "Nubian".to_string(),
                gender: gender.to_string(),
                ..Default::default()
            })
            .expect("录入山羊失败")
    }
}
