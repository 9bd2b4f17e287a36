// ==========================================
// GoatOS 牧场记录系统 - 牧场设置
// ==========================================
// 说明: 一次加载后以值的形式显式传递，不做全局单例
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认牧场名称
pub const DEFAULT_FARM_NAME: &str = "My Homestead";

/// 牧场级设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSettings {
    pub farm_name: String,
    pub farm_owner: String,
    pub latitude: f64,
    pub longitude: f64,
    /// 访问 PIN；None 表示不启用 PIN 校验
    #[serde(skip_serializing)]
    pub pin: Option<String>,
}

impl Default for FarmSettings {
    fn default() -> Self {
        Self {
            farm_name: DEFAULT_FARM_NAME.to_string(),
            farm_owner: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            pin: None,
        }
    }
}

impl FarmSettings {
    /// 是否配置了有效坐标（0,0 视为未配置）
    pub fn has_location(&self) -> bool {
        self.latitude != 0.0 || self.longitude != 0.0
    }
}
