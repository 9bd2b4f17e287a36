// ==========================================
// GoatOS 牧场记录系统 - 库存领域模型 (饲料 / 药品)
// ==========================================
// 职责: 低库存判定、过期判定、剂量说明
// 红线: 库存提醒不依赖日期窗口，满足条件即提醒
// ==========================================

use crate::domain::derivation::SkipReason;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// FeedItem - 饲料库存
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub item_id: String,
    pub name: String, // 例: Alfalfa Hay
    pub quantity: f64,
    pub unit: String,           // 例: Bales, lbs
    pub low_stock_threshold: f64, // 低于等于此值即提醒
}

impl FeedItem {
    pub fn new(name: String, quantity: f64, unit: String, low_stock_threshold: f64) -> Self {
        Self {
            item_id: uuid::Uuid::new_v4().to_string(),
            name,
            quantity,
            unit,
            low_stock_threshold,
        }
    }

    /// 是否低库存（含等于阈值）
    ///
    /// 数量或阈值不是有限数时返回 InvalidQuantity
    pub fn is_low(&self) -> Result<bool, SkipReason> {
        if !self.quantity.is_finite() || !self.low_stock_threshold.is_finite() {
            return Err(SkipReason::InvalidQuantity(format!(
                "quantity={}, threshold={}",
                self.quantity, self.low_stock_threshold
            )));
        }
        Ok(self.quantity <= self.low_stock_threshold)
    }
}

// ==========================================
// Medicine - 药品库存
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub medicine_id: String,
    pub name: String,
    pub batch: String,
    pub expiration_date: Option<NaiveDate>,
    pub quantity: f64,
    pub unit: String, // ml / g / pill / oz

    // 剂量: dosage_amount 每 dosage_weight_interval 磅体重; 间隔为 0 表示固定剂量
    pub dosage_amount: f64,
    pub dosage_weight_interval: f64,

    pub notes: String,
}

impl Medicine {
    /// 是否已过期: expiration_date < today（无有效期视为不过期）
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration_date.map(|exp| exp < today).unwrap_or(false)
    }

    /// 剂量说明
    pub fn dosage_instruction(&self) -> String {
        if self.dosage_weight_interval > 0.0 {
            format!(
                "{}{} / {}lbs",
                self.dosage_amount, self.unit, self.dosage_weight_interval
            )
        } else {
            format!("{}{} (Fixed)", self.dosage_amount, self.unit)
        }
    }

    /// 按体重计算剂量（固定剂量时直接返回 dosage_amount）
    pub fn dose_for_weight(&self, weight_lbs: f64) -> f64 {
        if self.dosage_weight_interval > 0.0 {
            weight_lbs / self.dosage_weight_interval * self.dosage_amount
        } else {
            self.dosage_amount
        }
    }
}
