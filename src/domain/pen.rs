// ==========================================
// GoatOS 牧场记录系统 - 圈舍领域模型
// ==========================================
// 职责: 圈舍、入圈记录、占用统计
// ==========================================

use crate::domain::derivation::SkipReason;
use crate::domain::types::PenType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Pen - 圈舍
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    pub pen_id: String,
    pub name: String,
    pub pen_type: PenType,
    pub capacity: i64,
    pub notes: String,
}

impl Pen {
    pub fn new(name: String, pen_type: PenType, capacity: i64, notes: String) -> Self {
        Self {
            pen_id: uuid::Uuid::new_v4().to_string(),
            name,
            pen_type,
            capacity,
            notes,
        }
    }
}

// ==========================================
// PenAssignment - 入圈记录
// ==========================================
// date_out 为空表示仍在圈内
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenAssignment {
    pub assignment_id: String,
    pub pen_id: String,
    pub goat_id: String,
    pub date_in: NaiveDate,
    pub date_out: Option<NaiveDate>,
    pub notes: String,
}

impl PenAssignment {
    pub fn new(pen_id: String, goat_id: String, date_in: NaiveDate, notes: String) -> Self {
        Self {
            assignment_id: uuid::Uuid::new_v4().to_string(),
            pen_id,
            goat_id,
            date_in,
            date_out: None,
            notes,
        }
    }
}

// ==========================================
// PenOccupancy - 圈舍占用
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenOccupancy {
    pub pen: Pen,
    pub active_count: i64, // 未出圈的入圈记录数（库内统计）
}

impl PenOccupancy {
    /// 是否超容: active_count > capacity
    pub fn is_over_capacity(&self) -> Result<bool, SkipReason> {
        if self.pen.capacity < 0 {
            return Err(SkipReason::InvalidCapacity(self.pen.capacity));
        }
        Ok(self.active_count > self.pen.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_capacity_is_strict() {
        let pen = Pen::new("Buck".into(), PenType::Buck, 1, String::new());
        let over = PenOccupancy { pen: pen.clone(), active_count: 2 };
        let full = PenOccupancy { pen, active_count: 1 };
        assert!(over.is_over_capacity().unwrap());
        assert!(!full.is_over_capacity().unwrap());
    }

    #[test]
    fn test_negative_capacity_is_skip() {
        let pen = Pen::new("Bad".into(), PenType::General, -1, String::new());
        let occupancy = PenOccupancy { pen, active_count: 0 };
        assert_eq!(occupancy.is_over_capacity(), Err(SkipReason::InvalidCapacity(-1)));
    }
}
