// ==========================================
// GoatOS 牧场记录系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、派生字段
// 红线: 不含数据访问逻辑，派生字段只读不落库
// ==========================================

pub mod breeding;
pub mod derivation;
pub mod farm_event;
pub mod finance;
pub mod goat;
pub mod harvest;
pub mod health_score;
pub mod heat;
pub mod husbandry;
pub mod medical;
pub mod pasture;
pub mod pen;
pub mod stock;
pub mod types;

// 重导出核心类型
pub use breeding::{projected_due_date, BreedingEvent, KiddingRecord};
pub use derivation::SkipReason;
pub use farm_event::FarmEvent;
pub use finance::{FinanceSummary, Transaction};
pub use goat::Goat;
pub use harvest::MeatHarvest;
pub use health_score::HealthScore;
pub use heat::HeatObservation;
pub use husbandry::{FeedingLog, MilkLog, MilkSummary, WeightLog};
pub use medical::{MedicalEvent, RecurringSchedule, ScheduleTarget};
pub use pasture::{GrazingArea, LatLng, PastureAssignment};
pub use pen::{Pen, PenAssignment, PenOccupancy};
pub use stock::{FeedItem, Medicine};
pub use types::{
    BirthType, FeedType, Gender, GoatStatus, MedicalKind, MilkingTime, PenType, Presentation,
    TransactionCategory, TransactionType,
};
