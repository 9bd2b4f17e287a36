// ==========================================
// GoatOS 牧场记录系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 单牧场山羊畜群记录 + 到期提醒
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 提醒/日历派生计算
pub mod engine;

// 配置层 - 牧场设置与提醒窗口
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// PIN 访问控制
pub mod auth;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    BirthType, FeedType, Gender, GoatStatus, MedicalKind, MilkingTime, PenType, Presentation,
    TransactionCategory, TransactionType,
};

// 领域实体
pub use domain::{
    BreedingEvent, FarmEvent, FeedItem, FeedingLog, Goat, GrazingArea, HealthScore,
    HeatObservation, KiddingRecord, MedicalEvent, Medicine, MilkLog, PastureAssignment, Pen,
    PenAssignment, PenOccupancy, RecurringSchedule, ScheduleTarget, Transaction, WeightLog,
};

// 引擎
pub use engine::{compute_alerts, AlertEngine, AlertInputs, AlertSet, AlertWindows};

// API
pub use api::{AlertApi, BarnApi, ExportApi, FinanceApi, HealthApi, HerdApi, HusbandryApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "GoatOS";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "GoatOS");
    }
}
