// ==========================================
// GoatOS 牧场记录系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 约定: 所有仓储与配置共用同一个数据库连接
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AlertApi, BarnApi, ExportApi, FinanceApi, HealthApi, HerdApi, HusbandryApi};
use crate::auth::PinGate;
use crate::config::{AlertConfigReader, ConfigManager, FarmSettings};
use crate::repository::{
    BreedingRepository, FarmEventRepository, FinanceRepository, GoatRepository,
    HealthScoreRepository, HeatRepository, HusbandryRepository, MedicalRepository,
    PastureRepository, PenRepository, StockRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 提醒/日历API
    pub alert_api: Arc<AlertApi>,

    /// 健康/繁殖记录API
    pub health_api: Arc<HealthApi>,

    /// 圈舍/库存/放牧区API
    pub barn_api: Arc<BarnApi>,

    /// 畜群档案API
    pub herd_api: Arc<HerdApi>,

    /// 收支API
    pub finance_api: Arc<FinanceApi>,

    /// 饲喂/挤奶/体重API
    pub husbandry_api: Arc<HusbandryApi>,

    /// 导出API
    pub export_api: Arc<ExportApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 启动时加载的牧场设置
    pub farm_settings: FarmSettings,

    /// PIN 访问控制
    pub pin_gate: PinGate,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    /// 4. 加载牧场设置与 PIN
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::db::init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
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

        // 配置管理器
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let config_reader: Arc<dyn AlertConfigReader> = config_manager.clone();

        // ==========================================
        // 初始化API层
        // ==========================================
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
            pen_repo,
            stock_repo,
            pasture_repo.clone(),
        ));
        let herd_api = Arc::new(HerdApi::new(goat_repo.clone(), farm_event_repo));
        let finance_api = Arc::new(FinanceApi::new(goat_repo.clone(), finance_repo.clone()));
        let husbandry_api = Arc::new(HusbandryApi::new(goat_repo.clone(), husbandry_repo.clone()));
        let export_api = Arc::new(ExportApi::new(
            goat_repo,
            medical_repo,
            pasture_repo,
            finance_repo,
            husbandry_repo,
        ));

        let farm_settings = config_manager
            .load_farm_settings()
            .map_err(|e| format!("加载牧场设置失败: {}", e))?;
        let pin_gate = PinGate::from_settings(&farm_settings);

        tracing::info!(
            farm_name = %farm_settings.farm_name,
            pin_enabled = pin_gate.is_enabled(),
            "AppState初始化完成"
        );

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
            farm_settings,
            pin_gate,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: GOATOS_DB_PATH 环境变量 → 用户数据目录/goatos/goatos.db → ./goatos.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("GOATOS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./goatos.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("goatos");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("goatos.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_on_fresh_db() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);
        assert_eq!(state.farm_settings.farm_name, "My Homestead");
        assert!(!state.pin_gate.is_enabled());

        // 重复打开同一数据库不报错
        assert!(AppState::new(db_path).is_ok());
    }
}
