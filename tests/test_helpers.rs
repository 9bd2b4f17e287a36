// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、共享连接等功能
// ==========================================

#![allow(dead_code)]

use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("临时路径非 UTF-8")?.to_string();

    let conn = open_test_connection(&db_path)?;
    goatos::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试连接（统一 PRAGMA）
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(goatos::db::open_sqlite_connection(db_path)?)
}

/// 打开供仓储共享的连接
pub fn shared_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    Ok(Arc::new(Mutex::new(open_test_connection(db_path)?)))
}
