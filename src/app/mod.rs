// ==========================================
// GoatOS 牧场记录系统 - 应用层
// ==========================================
// 职责: 组装数据库连接、仓储与 API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
