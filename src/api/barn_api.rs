// ==========================================
// GoatOS 牧场记录系统 - 圈舍/库存/放牧区 API
// ==========================================
// 职责: 圈舍与入圈管理、饲料药品库存、放牧区录入与轮牧
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    parse_date, parse_optional_date, parse_pen_type, require_non_empty, require_non_negative,
};
use crate::domain::pasture::days_resting;
use crate::domain::{
    FeedItem, GrazingArea, Medicine, PastureAssignment, Pen, PenAssignment, PenOccupancy,
};
use crate::repository::{GoatRepository, PastureRepository, PenRepository, StockRepository};

/// 轮牧历史展示条数上限
pub const ROTATION_HISTORY_LIMIT: usize = 20;

/// 药品录入参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicineInput {
    pub name: String,
    pub batch: String,
    pub expiration_date: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub dosage_amount: f64,
    pub dosage_weight_interval: f64,
    pub notes: String,
}

/// 轮牧历史中的一条
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationEntry {
    pub assignment: PastureAssignment,
    pub is_active: bool,
    /// 与 goat_ids 同序；已删除的山羊不出现
    pub goat_names: Vec<String>,
}

/// 放牧区轮牧历史
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationHistory {
    pub entries: Vec<RotationEntry>,
    /// 距最近一次轮牧结束的天数；从未结束过时为 None
    pub days_resting: Option<i64>,
}

// ==========================================
// BarnApi
// ==========================================
pub struct BarnApi {
    goat_repo: Arc<GoatRepository>,
    pen_repo: Arc<PenRepository>,
    stock_repo: Arc<StockRepository>,
    pasture_repo: Arc<PastureRepository>,
}

impl BarnApi {
    pub fn new(
        goat_repo: Arc<GoatRepository>,
        pen_repo: Arc<PenRepository>,
        stock_repo: Arc<StockRepository>,
        pasture_repo: Arc<PastureRepository>,
    ) -> Self {
        Self {
            goat_repo,
            pen_repo,
            stock_repo,
            pasture_repo,
        }
    }

    // ===== 圈舍 =====

    /// 新增圈舍（容量不能为负）
    pub fn add_pen(
        &self,
        name: &str,
        pen_type: &str,
        capacity: i64,
        notes: &str,
    ) -> ApiResult<Pen> {
        if capacity < 0 {
            return Err(ApiError::InvalidInput(format!("圈舍容量不能为负: {}", capacity)));
        }
        let pen = Pen::new(
            require_non_empty("name", name)?,
            parse_pen_type(pen_type),
            capacity,
            notes.to_string(),
        );
        self.pen_repo.insert_pen(&pen)?;
        Ok(pen)
    }

    /// 山羊入圈（自动结束原在圈记录）
    pub fn assign(
        &self,
        goat_id: &str,
        pen_id: &str,
        date_in: &str,
        notes: &str,
    ) -> ApiResult<PenAssignment> {
        if self.goat_repo.find_by_id(goat_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Goat(id={})不存在", goat_id)));
        }
        let assignment = PenAssignment::new(
            pen_id.to_string(),
            goat_id.to_string(),
            parse_date("date_in", date_in)?,
            notes.to_string(),
        );
        self.pen_repo.assign(&assignment)?;
        info!(goat_id = %goat_id, pen_id = %pen_id, "山羊已入圈");
        Ok(assignment)
    }

    /// 山羊出圈
    ///
    /// # 返回
    /// - Err(BusinessRuleViolation): 该山羊当前不在任何圈舍
    pub fn remove(&self, goat_id: &str, date_out: &str) -> ApiResult<()> {
        let closed = self.pen_repo.remove(goat_id, parse_date("date_out", date_out)?)?;
        if closed == 0 {
            return Err(ApiError::BusinessRuleViolation(format!(
                "山羊 {} 当前不在任何圈舍",
                goat_id
            )));
        }
        Ok(())
    }

    pub fn list_occupancy(&self) -> ApiResult<Vec<PenOccupancy>> {
        Ok(self.pen_repo.list_occupancy()?)
    }

    // ===== 库存 =====

    pub fn add_feed(
        &self,
        name: &str,
        quantity: f64,
        unit: &str,
        low_stock_threshold: f64,
    ) -> ApiResult<FeedItem> {
        let item = FeedItem::new(
            require_non_empty("name", name)?,
            require_non_negative("quantity", quantity)?,
            unit.to_string(),
            require_non_negative("low_stock_threshold", low_stock_threshold)?,
        );
        self.stock_repo.insert_feed(&item)?;
        Ok(item)
    }

    /// 调整饲料数量，返回调整后的数量（不低于 0）
    pub fn adjust_feed(&self, item_id: &str, delta: f64) -> ApiResult<f64> {
        let quantity = self.stock_repo.adjust_quantity(item_id, delta)?;
        info!(item_id = %item_id, delta = delta, quantity = quantity, "饲料库存已调整");
        Ok(quantity)
    }

    pub fn add_medicine(&self, input: &MedicineInput) -> ApiResult<Medicine> {
        let medicine = Medicine {
            medicine_id: uuid::Uuid::new_v4().to_string(),
            name: require_non_empty("name", &input.name)?,
            batch: input.batch.clone(),
            expiration_date: parse_optional_date(
                "expiration_date",
                input.expiration_date.as_deref(),
            )?,
            quantity: require_non_negative("quantity", input.quantity)?,
            unit: input.unit.clone(),
            dosage_amount: require_non_negative("dosage_amount", input.dosage_amount)?,
            dosage_weight_interval: require_non_negative(
                "dosage_weight_interval",
                input.dosage_weight_interval,
            )?,
            notes: input.notes.clone(),
        };
        self.stock_repo.insert_medicine(&medicine)?;
        Ok(medicine)
    }

    // ===== 放牧区 =====

    /// 新增放牧区；坐标必须是可解析的 JSON 点列表
    pub fn add_grazing_area(
        &self,
        name: &str,
        color: &str,
        coordinates: &str,
    ) -> ApiResult<GrazingArea> {
        let area = GrazingArea {
            area_id: uuid::Uuid::new_v4().to_string(),
            name: require_non_empty("name", name)?,
            color: color.trim().to_string(),
            coordinates: coordinates.to_string(),
        };
        area.parse_coordinates()
            .map_err(|reason| ApiError::InvalidInput(reason.to_string()))?;
        self.pasture_repo.insert(&area)?;
        Ok(area)
    }
    // ===== 轮牧 =====

    /// 新建轮牧：把一组山羊放到某放牧区
    ///
    /// # 返回
    /// - Err(InvalidInput): 山羊名单为空或日期非法
    /// - Err(NotFound): 放牧区或某只山羊不存在
    pub fn assign_pasture(
        &self,
        area_id: &str,
        goat_ids: &[String],
        start_date: &str,
        notes: &str,
    ) -> ApiResult<PastureAssignment> {
        if goat_ids.is_empty() {
            return Err(ApiError::InvalidInput("轮牧至少需要一只山羊".to_string()));
        }
        let start_date = parse_date("start_date", start_date)?;
        let mut unique: Vec<String> = Vec::with_capacity(goat_ids.len());
        for id in goat_ids {
            if !unique.contains(id) {
                unique.push(id.clone());
            }
        }

        let assignment =
            PastureAssignment::new(area_id.to_string(), unique, start_date, notes.to_string());
        self.pasture_repo.insert_assignment(&assignment)?;
        info!(
            area_id = %area_id,
            goats = assignment.goat_ids.len(),
            "轮牧已开始"
        );
        Ok(assignment)
    }

    /// 结束轮牧
    pub fn end_pasture_assignment(&self, assignment_id: &str, end_date: &str) -> ApiResult<()> {
        let end_date = parse_date("end_date", end_date)?;
        self.pasture_repo.end_assignment(assignment_id, end_date)?;
        Ok(())
    }

    /// 某放牧区的轮牧历史（最近 20 条）与休牧天数
    pub fn rotation_history(&self, area_id: &str, today: NaiveDate) -> ApiResult<RotationHistory> {
        let assignments = self.pasture_repo.list_assignments_for_area(area_id)?;
        let goats = self.goat_repo.list_all()?;
        let names: HashMap<&str, &str> = goats
            .iter()
            .map(|g| (g.goat_id.as_str(), g.name.as_str()))
            .collect();

        let resting = days_resting(today, &assignments);
        let entries = assignments
            .into_iter()
            .take(ROTATION_HISTORY_LIMIT)
            .map(|assignment| RotationEntry {
                is_active: assignment.is_active(today),
                goat_names: assignment
                    .goat_ids
                    .iter()
                    .filter_map(|id| names.get(id.as_str()).map(|n| n.to_string()))
                    .collect(),
                assignment,
            })
            .collect();

        Ok(RotationHistory {
            entries,
            days_resting: resting,
        })
    }
}
