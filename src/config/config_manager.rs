// ==========================================
// GoatOS 牧场记录系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 约定: 键缺失时取默认值；值格式错误时记 warn 并取默认值
// ==========================================

use crate::config::alert_config_trait::AlertConfigReader;
use crate::config::farm_settings::{FarmSettings, DEFAULT_FARM_NAME};
use crate::config::ConfigResult;
use crate::engine::AlertWindows;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// 配置作用域（目前只有全局）
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 读取并解析配置，缺失或格式错误时返回默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };
        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置值格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    /// 写入单个配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err("配置键不能为空".into());
        }

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        tracing::info!(config_key = key, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式，按键排序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key",
        )?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 快照中的键覆盖现有值；快照中没有的键保持不变
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value",
                params![GLOBAL_SCOPE, key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    /// 加载牧场设置（同步版本，供启动时使用）
    pub fn load_farm_settings(&self) -> ConfigResult<FarmSettings> {
        let pin = self
            .get_config_value(config_keys::FARM_PIN)?
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(FarmSettings {
            farm_name: self
                .get_config_value(config_keys::FARM_NAME)?
                .unwrap_or_else(|| DEFAULT_FARM_NAME.to_string()),
            farm_owner: self.get_config_value(config_keys::FARM_OWNER)?.unwrap_or_default(),
            latitude: self.get_parsed_or_default(config_keys::FARM_LATITUDE, 0.0_f64)?,
            longitude: self.get_parsed_or_default(config_keys::FARM_LONGITUDE, 0.0_f64)?,
            pin,
        })
    }

    /// 加载提醒窗口（同步版本）
    pub fn load_alert_windows(&self) -> ConfigResult<AlertWindows> {
        let defaults = AlertWindows::default();
        Ok(AlertWindows {
            kidding_days: self
                .get_parsed_or_default(config_keys::KIDDING_WINDOW_DAYS, defaults.kidding_days)?,
            medical_days: self
                .get_parsed_or_default(config_keys::MEDICAL_WINDOW_DAYS, defaults.medical_days)?,
            schedule_days: self
                .get_parsed_or_default(config_keys::SCHEDULE_WINDOW_DAYS, defaults.schedule_days)?,
            heat_days: self
                .get_parsed_or_default(config_keys::HEAT_WINDOW_DAYS, defaults.heat_days)?,
        })
    }
}

// ==========================================
// AlertConfigReader Trait 实现
// ==========================================
#[async_trait]
impl AlertConfigReader for ConfigManager {
    async fn get_kidding_window_days(&self) -> ConfigResult<u64> {
        let default = AlertWindows::default().kidding_days;
        self.get_parsed_or_default(config_keys::KIDDING_WINDOW_DAYS, default)
    }

    async fn get_medical_window_days(&self) -> ConfigResult<u64> {
        let default = AlertWindows::default().medical_days;
        self.get_parsed_or_default(config_keys::MEDICAL_WINDOW_DAYS, default)
    }

    async fn get_schedule_window_days(&self) -> ConfigResult<u64> {
        let default = AlertWindows::default().schedule_days;
        self.get_parsed_or_default(config_keys::SCHEDULE_WINDOW_DAYS, default)
    }

    async fn get_heat_window_days(&self) -> ConfigResult<u64> {
        let default = AlertWindows::default().heat_days;
        self.get_parsed_or_default(config_keys::HEAT_WINDOW_DAYS, default)
    }

    async fn get_farm_settings(&self) -> ConfigResult<FarmSettings> {
        self.load_farm_settings()
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 牧场信息
    pub const FARM_NAME: &str = "farm_name";
    pub const FARM_OWNER: &str = "farm_owner";
    pub const FARM_LATITUDE: &str = "farm_latitude";
    pub const FARM_LONGITUDE: &str = "farm_longitude";

    // 访问控制
    pub const FARM_PIN: &str = "farm_pin";

    // 提醒窗口（天）
    pub const MEDICAL_WINDOW_DAYS: &str = "medical_window_days";
    pub const SCHEDULE_WINDOW_DAYS: &str = "schedule_window_days";
    pub const KIDDING_WINDOW_DAYS: &str = "kidding_window_days";
    pub const HEAT_WINDOW_DAYS: &str = "heat_window_days";
}
