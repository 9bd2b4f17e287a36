// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证配置读取、默认值回退、快照恢复
// ==========================================

mod test_helpers;

use goatos::config::{config_keys, AlertConfigReader, ConfigManager};
use goatos::engine::AlertWindows;
use test_helpers::{create_test_db, shared_connection};

fn manager(db_path: &str) -> ConfigManager {
    ConfigManager::from_connection(shared_connection(db_path).unwrap())
        .expect("Failed to create ConfigManager")
}

#[tokio::test]
async fn test_default_alert_windows() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = manager(&db_path);

    let windows = config_manager.get_alert_windows().await.unwrap();
    assert_eq!(windows, AlertWindows::default());
    assert_eq!(windows.kidding_days, 21);
    assert_eq!(windows.medical_days, 14);
    assert_eq!(windows.schedule_days, 14);
    assert_eq!(windows.heat_days, 3);
}

#[tokio::test]
async fn test_override_and_malformed_windows() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let config_manager = manager(&db_path);

    config_manager
        .set_config_value(config_keys::KIDDING_WINDOW_DAYS, "30")
        .unwrap();
    config_manager
        .set_config_value(config_keys::HEAT_WINDOW_DAYS, "three")
        .unwrap();
    config_manager
        .set_config_value(config_keys::MEDICAL_WINDOW_DAYS, "-1")
        .unwrap();

    assert_eq!(config_manager.get_kidding_window_days().await.unwrap(), 30);
    // 格式错误回退默认值
    assert_eq!(config_manager.get_heat_window_days().await.unwrap(), 3);
    assert_eq!(config_manager.get_medical_window_days().await.unwrap(), 14);

    // 同步加载与 trait 读取一致
    let windows = config_manager.load_alert_windows().unwrap();
    assert_eq!(windows, config_manager.get_alert_windows().await.unwrap());
}

#[tokio::test]
async fn test_farm_settings() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let config_manager = manager(&db_path);

    let settings = config_manager.get_farm_settings().await.unwrap();
    assert_eq!(settings.farm_name, "My Homestead");
    assert!(settings.pin.is_none());
    assert!(!settings.has_location());

    config_manager.set_config_value(config_keys::FARM_NAME, "Hillside Goats").unwrap();
    config_manager.set_config_value(config_keys::FARM_LATITUDE, "44.5").unwrap();
    config_manager.set_config_value(config_keys::FARM_LONGITUDE, "-72.6").unwrap();
    config_manager.set_config_value(config_keys::FARM_PIN, " 4321 ").unwrap();

    let settings = config_manager.load_farm_settings().unwrap();
    assert_eq!(settings.farm_name, "Hillside Goats");
    assert!(settings.has_location());
    assert_eq!(settings.pin.as_deref(), Some("4321"));
}

#[test]
fn test_snapshot_roundtrip_restores_overwritten_values() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let config_manager = manager(&db_path);

    config_manager.set_config_value(config_keys::KIDDING_WINDOW_DAYS, "30").unwrap();
    config_manager.set_config_value(config_keys::FARM_NAME, "Hillside Goats").unwrap();
    let snapshot = config_manager.get_config_snapshot().unwrap();

    config_manager.set_config_value(config_keys::KIDDING_WINDOW_DAYS, "7").unwrap();
    let restored = config_manager.restore_config_from_snapshot(&snapshot).unwrap();
    assert_eq!(restored, 2);

    assert_eq!(
        config_manager
            .get_global_config_value(config_keys::KIDDING_WINDOW_DAYS)
            .unwrap()
            .as_deref(),
        Some("30")
    );
    assert!(config_manager.set_config_value("  ", "x").is_err());
    assert!(config_manager.restore_config_from_snapshot("not json").is_err());
}
