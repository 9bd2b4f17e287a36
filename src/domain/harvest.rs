// ==========================================
// GoatOS 牧场记录系统 - 屠宰记录
// ==========================================

use serde::{Deserialize, Serialize};

/// 屠宰记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeatHarvest {
    pub goat_id: String,
    pub live_weight: f64,    // 活重 (lbs)
    pub hanging_weight: f64, // 胴体重 (lbs)
}

impl MeatHarvest {
    /// 屠宰率 (%)，活重非正时为 0
    pub fn yield_percentage(&self) -> f64 {
        if self.live_weight > 0.0 {
            self.hanging_weight / self.live_weight * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yield_percentage() {
        let harvest = MeatHarvest { goat_id: "g".into(), live_weight: 100.0, hanging_weight: 50.0 };
        assert_eq!(harvest.yield_percentage(), 50.0);

        let harvest = MeatHarvest { goat_id: "g".into(), live_weight: 0.0, hanging_weight: 50.0 };
        assert_eq!(harvest.yield_percentage(), 0.0);
    }
}
