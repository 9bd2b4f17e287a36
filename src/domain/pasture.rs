// ==========================================
// GoatOS 牧场记录系统 - 放牧区领域模型
// ==========================================
// 职责: 放牧区多边形 (坐标以 JSON 文本存储) + 轮牧记录
// 说明: 坐标解析失败只影响该放牧区，调用方跳过即可
// ==========================================

use crate::domain::derivation::SkipReason;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 坐标点（与存储 JSON 字段名一致）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

// ==========================================
// GrazingArea - 放牧区
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrazingArea {
    pub area_id: String,
    pub name: String,
    pub color: String,       // #RRGGBB
    pub coordinates: String, // JSON: [{"lat":..,"lng":..}, ...]
}

impl GrazingArea {
    /// 解析多边形坐标
    pub fn parse_coordinates(&self) -> Result<Vec<LatLng>, SkipReason> {
        serde_json::from_str::<Vec<LatLng>>(&self.coordinates)
            .map_err(|e| SkipReason::MalformedCoordinates(format!("{}: {}", self.name, e)))
    }
}

// ==========================================
// PastureAssignment - 轮牧记录
// ==========================================
// 一次轮牧可带多只山羊；end_date 为空表示仍在放牧
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastureAssignment {
    pub assignment_id: String,
    pub area_id: String,
    pub goat_ids: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: String,
}

impl PastureAssignment {
    pub fn new(
        area_id: String,
        goat_ids: Vec<String>,
        start_date: NaiveDate,
        notes: String,
    ) -> Self {
        Self {
            assignment_id: uuid::Uuid::new_v4().to_string(),
            area_id,
            goat_ids,
            start_date,
            end_date: None,
            notes,
        }
    }

    /// 未结束，或结束日不早于 today
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.end_date.map(|end| end >= today).unwrap_or(true)
    }
}

/// 放牧区休牧天数 = today - 最近一次已结束轮牧的结束日
///
/// 从未结束过轮牧时为 None；结束日在 today 之后时为负数
pub fn days_resting(today: NaiveDate, assignments: &[PastureAssignment]) -> Option<i64> {
    assignments
        .iter()
        .filter_map(|a| a.end_date)
        .max()
        .map(|last_end| (today - last_end).num_days())
}
