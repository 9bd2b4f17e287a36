// ==========================================
// GoatOS 牧场记录系统 - 日常饲养记录仓储
// ==========================================
// 职责: feeding_log / milk_log / weight_log 表
// ==========================================

use crate::domain::derivation::{parse_stored_date, unknown_value};
use crate::domain::types::{FeedType, MilkingTime};
use crate::domain::{FeedingLog, MilkLog, WeightLog};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{collect_rows, date_to_db, ParsedRow};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const FEEDING_COLUMNS: &str = "log_id, goat_id, date, feed_type, amount, notes";
const MILK_COLUMNS: &str = "log_id, goat_id, date, time, amount_lbs, notes";
const WEIGHT_COLUMNS: &str = "log_id, goat_id, date, weight_lbs, notes";

pub struct HusbandryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HusbandryRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn delete_by_id(&self, table: &str, entity: &str, log_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let sql = format!("DELETE FROM {} WHERE log_id = ?1", table);
        if conn.execute(&sql, params![log_id])? == 0 {
            return Err(RepositoryError::not_found(entity, log_id));
        }
        Ok(())
    }

    // ===== 饲喂 =====

    pub fn insert_feeding(&self, log: &FeedingLog) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO feeding_log (log_id, goat_id, date, feed_type, amount, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                log.log_id,
                log.goat_id,
                date_to_db(log.date),
                log.feed_type.to_db_str(),
                log.amount,
                log.notes,
            ],
        )?;
        Ok(())
    }

    /// 某只山羊的饲喂记录（最近在前）
    pub fn list_feeding_by_goat(&self, goat_id: &str) -> RepositoryResult<Vec<FeedingLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM feeding_log WHERE goat_id = ?1 ORDER BY date DESC, rowid",
            FEEDING_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![goat_id], map_feeding_row)?;
        collect_rows("feeding_log", rows)
    }

    pub fn delete_feeding(&self, log_id: &str) -> RepositoryResult<()> {
        self.delete_by_id("feeding_log", "FeedingLog", log_id)
    }

    // ===== 挤奶 =====

    pub fn insert_milk(&self, log: &MilkLog) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO milk_log (log_id, goat_id, date, time, amount_lbs, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                log.log_id,
                log.goat_id,
                date_to_db(log.date),
                log.time.to_db_str(),
                log.amount_lbs,
                log.notes,
            ],
        )?;
        Ok(())
    }

    /// 全部挤奶记录（日期倒序，同日 PM 在前）
    pub fn list_milk(&self) -> RepositoryResult<Vec<MilkLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM milk_log ORDER BY date DESC, time DESC, rowid",
            MILK_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_milk_row)?;
        collect_rows("milk_log", rows)
    }

    pub fn delete_milk(&self, log_id: &str) -> RepositoryResult<()> {
        self.delete_by_id("milk_log", "MilkLog", log_id)
    }

    // ===== 体重 =====

    pub fn insert_weight(&self, log: &WeightLog) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO weight_log (log_id, goat_id, date, weight_lbs, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                log.log_id,
                log.goat_id,
                date_to_db(log.date),
                log.weight_lbs,
                log.notes,
            ],
        )?;
        Ok(())
    }

    /// 某只山羊的体重曲线（日期升序）
    pub fn list_weights_by_goat(&self, goat_id: &str) -> RepositoryResult<Vec<WeightLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM weight_log WHERE goat_id = ?1 ORDER BY date, rowid",
            WEIGHT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![goat_id], map_weight_row)?;
        collect_rows("weight_log", rows)
    }

    /// 全群最近的体重记录（日期倒序，最多 limit 条）
    pub fn list_recent_weights(&self, limit: u32) -> RepositoryResult<Vec<WeightLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM weight_log ORDER BY date DESC, rowid DESC LIMIT ?1",
            WEIGHT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit], map_weight_row)?;
        collect_rows("weight_log", rows)
    }

    pub fn delete_weight(&self, log_id: &str) -> RepositoryResult<()> {
        self.delete_by_id("weight_log", "WeightLog", log_id)
    }
}

fn map_feeding_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<FeedingLog>> {
    let date_raw: String = row.get(2)?;
    let date = match parse_stored_date("date", &date_raw) {
        Ok(d) => d,
        Err(reason) => return Ok(Err(reason)),
    };
    Ok(Ok(FeedingLog {
        log_id: row.get(0)?,
        goat_id: row.get(1)?,
        date,
        feed_type: FeedType::from_db_str(&row.get::<_, String>(3)?),
        amount: row.get(4)?,
        notes: row.get(5)?,
    }))
}

fn map_milk_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<MilkLog>> {
    let log_id: String = row.get(0)?;
    let goat_id: String = row.get(1)?;
    let date_raw: String = row.get(2)?;
    let time_raw: String = row.get(3)?;
    let amount_lbs: f64 = row.get(4)?;
    let notes: String = row.get(5)?;

    let parse = || -> ParsedRow<MilkLog> {
        Ok(MilkLog {
            log_id,
            goat_id,
            date: parse_stored_date("date", &date_raw)?,
            time: MilkingTime::from_db_str(&time_raw)
                .ok_or_else(|| unknown_value("time", &time_raw))?,
            amount_lbs,
            notes,
        })
    };
    Ok(parse())
}

fn map_weight_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<WeightLog>> {
    let date_raw: String = row.get(2)?;
    let date = match parse_stored_date("date", &date_raw) {
        Ok(d) => d,
        Err(reason) => return Ok(Err(reason)),
    };
    Ok(Ok(WeightLog {
        log_id: row.get(0)?,
        goat_id: row.get(1)?,
        date,
        weight_lbs: row.get(3)?,
        notes: row.get(4)?,
    }))
}
