// ==========================================
// GoatOS 牧场记录系统 - 配置层
// ==========================================
// 职责: 牧场设置与提醒窗口的读取/覆写
// 存储: config_kv 表
// ==========================================

pub mod alert_config_trait;
pub mod config_manager;
pub mod farm_settings;

/// 配置层 Result 类型
pub type ConfigResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

// 重导出核心配置管理器
pub use alert_config_trait::AlertConfigReader;
pub use config_manager::{config_keys, ConfigManager};
pub use farm_settings::FarmSettings;
