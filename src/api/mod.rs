// ==========================================
// GoatOS 牧场记录系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，校验输入并委托给仓储/引擎
// ==========================================

pub mod alert_api;
pub mod barn_api;
pub mod error;
pub mod export_api;
pub mod finance_api;
pub mod health_api;
pub mod herd_api;
pub mod husbandry_api;
pub mod validator;

// 重导出核心类型
pub use alert_api::AlertApi;
pub use barn_api::{BarnApi, MedicineInput, RotationEntry, RotationHistory};
pub use error::{ApiError, ApiResult};
pub use export_api::ExportApi;
pub use finance_api::{FinanceApi, TransactionInput};
pub use health_api::{HealthApi, KiddingInput, RecordMedicalResponse};
pub use herd_api::{GoatInput, GoatSummary, HerdApi};
pub use husbandry_api::HusbandryApi;
