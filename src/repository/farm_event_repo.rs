// ==========================================
// GoatOS 牧场记录系统 - 自定义日历事件仓储
// ==========================================

use crate::domain::derivation::{parse_optional_date, parse_stored_date};
use crate::domain::FarmEvent;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{collect_rows, date_to_db, opt_date_to_db, ParsedRow};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct FarmEventRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FarmEventRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, event: &FarmEvent) -> RepositoryResult<()> {
        if let Some(end) = event.end_date {
            if end < event.date {
                return Err(RepositoryError::invalid_value(
                    "end_date",
                    format!("结束日期 {} 早于开始日期 {}", end, event.date),
                ));
            }
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO farm_event (event_id, title, date, end_date, category, description)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                event.event_id,
                event.title,
                date_to_db(event.date),
                opt_date_to_db(event.end_date),
                event.category,
                event.description,
            ],
        )?;
        Ok(())
    }

    /// 全部自定义事件（按开始日）
    pub fn list_all(&self) -> RepositoryResult<Vec<FarmEvent>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT event_id, title, date, end_date, category, description \
             FROM farm_event ORDER BY date, rowid",
        )?;
        let rows = stmt.query_map([], map_event_row)?;
        collect_rows("farm_event", rows)
    }

    pub fn delete(&self, event_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected =
            conn.execute("DELETE FROM farm_event WHERE event_id = ?1", params![event_id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("FarmEvent", event_id));
        }
        Ok(())
    }
}

fn map_event_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<FarmEvent>> {
    let event_id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let date_raw: String = row.get(2)?;
    let end_raw: Option<String> = row.get(3)?;
    let category: String = row.get(4)?;
    let description: String = row.get(5)?;

    let parse = || -> ParsedRow<FarmEvent> {
        Ok(FarmEvent {
            event_id,
            title,
            date: parse_stored_date("date", &date_raw)?,
            end_date: parse_optional_date("end_date", end_raw)?,
            category,
            description,
        })
    };
    Ok(parse())
}
