// ==========================================
// GoatOS 牧场记录系统 - 提醒配置读取 Trait
// ==========================================
// 职责: 定义 API 层所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::farm_settings::FarmSettings;
use crate::config::ConfigResult;
use crate::engine::AlertWindows;
use async_trait::async_trait;

// ==========================================
// AlertConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait AlertConfigReader: Send + Sync {
    // ===== 提醒窗口 =====

    /// 产羔提醒窗口（天）
    ///
    /// # 默认值
    /// - 21
    async fn get_kidding_window_days(&self) -> ConfigResult<u64>;

    /// 医疗记录提醒窗口（天）
    ///
    /// # 默认值
    /// - 14
    async fn get_medical_window_days(&self) -> ConfigResult<u64>;

    /// 周期计划提醒窗口（天）
    ///
    /// # 默认值
    /// - 14
    async fn get_schedule_window_days(&self) -> ConfigResult<u64>;

    /// 发情预测提醒窗口（天）
    ///
    /// # 默认值
    /// - 3
    async fn get_heat_window_days(&self) -> ConfigResult<u64>;

    /// 汇总为引擎使用的 AlertWindows
    async fn get_alert_windows(&self) -> ConfigResult<AlertWindows> {
        Ok(AlertWindows {
            kidding_days: self.get_kidding_window_days().await?,
            medical_days: self.get_medical_window_days().await?,
            schedule_days: self.get_schedule_window_days().await?,
            heat_days: self.get_heat_window_days().await?,
        })
    }

    // ===== 牧场设置 =====

    async fn get_farm_settings(&self) -> ConfigResult<FarmSettings>;
}
