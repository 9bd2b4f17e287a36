// ==========================================
// GoatOS 牧场记录系统 - 自定义日历事件
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 用户创建的日历事件（可编辑，区别于系统派生事件）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmEvent {
    pub event_id: String,
    pub title: String,
    pub date: NaiveDate,
    pub end_date: Option<NaiveDate>, // 含当天
    pub category: String,            // 例: Vet, Show, Maintenance
    pub description: String,
}

impl FarmEvent {
    pub fn new(
        title: String,
        date: NaiveDate,
        end_date: Option<NaiveDate>,
        category: String,
        description: String,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            title,
            date,
            end_date,
            category,
            description,
        }
    }
}
