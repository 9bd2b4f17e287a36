// ==========================================
// GoatOS 牧场记录系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 单行存储数据无法解析时跳过该行并记 warn
// ==========================================

pub mod breeding_repo;
pub mod error;
pub mod farm_event_repo;
pub mod finance_repo;
pub mod goat_repo;
pub mod health_score_repo;
pub mod heat_repo;
pub mod husbandry_repo;
pub mod medical_repo;
pub mod pasture_repo;
pub mod pen_repo;
pub mod row_utils;
pub mod stock_repo;

// 重导出核心仓储
pub use breeding_repo::BreedingRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use farm_event_repo::FarmEventRepository;
pub use finance_repo::FinanceRepository;
pub use goat_repo::GoatRepository;
pub use health_score_repo::HealthScoreRepository;
pub use heat_repo::HeatRepository;
pub use husbandry_repo::HusbandryRepository;
pub use medical_repo::MedicalRepository;
pub use pasture_repo::PastureRepository;
pub use pen_repo::PenRepository;
pub use stock_repo::StockRepository;
