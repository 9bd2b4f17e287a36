// ==========================================
// GoatOS 牧场记录系统 - 引擎层
// ==========================================
// 职责: 到期提醒、日历、产羔看板等派生计算
// 红线: Engine 不拼 SQL，不做 I/O；today 由调用方显式传入
// ==========================================

pub mod alerts;
pub mod calendar_feed;
pub mod error;
pub mod kidding_season;

// 重导出核心引擎
pub use alerts::{
    compute_alerts, famacha_alerts, latest_per_subject, AlertEngine, AlertInputs, AlertKind,
    AlertSet, AlertWindows, FamachaAlert, HeatAlert, KiddingAlert, MedicalAlert, OccupancyAlert,
    ScheduleAlert, SkippedRecord, StockAlert,
};
pub use calendar_feed::{
    build_calendar_feed, CalendarEntry, CalendarEntryKind, CalendarFeed, CalendarInputs,
};
pub use error::{parse_today, AlertError};
pub use kidding_season::{kidding_board, KiddingBoardEntry, KiddingUrgency};
