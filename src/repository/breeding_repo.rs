// ==========================================
// GoatOS 牧场记录系统 - 配种与产羔仓储
// ==========================================
// 红线: 预产期由 BreedingEvent::new 确定，仓储只落库不重算
// ==========================================

use crate::domain::derivation::parse_stored_date;
use crate::domain::types::{BirthType, Presentation};
use crate::domain::{BreedingEvent, KiddingRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{collect_rows, date_to_db, ParsedRow};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const BREEDING_COLUMNS: &str = "breeding_id, goat_id, mate_name, breeding_date, due_date, notes";
const KIDDING_COLUMNS: &str = "kidding_id, breeding_id, dam_id, kidding_date, \
                               num_kids_born, num_alive, num_stillborn, birth_type, \
                               presentation, assisted, complications, notes";

// ==========================================
// BreedingRepository - 配种/产羔仓储
// ==========================================
pub struct BreedingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BreedingRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 配种记录 =====

    pub fn insert(&self, event: &BreedingEvent) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO breeding_event (
                breeding_id, goat_id, mate_name, breeding_date, due_date, notes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                event.breeding_id,
                event.goat_id,
                event.mate_name,
                date_to_db(event.breeding_date),
                date_to_db(event.due_date),
                event.notes,
            ],
        )?;
        Ok(())
    }

    /// 全部配种记录（存储顺序）
    pub fn list_all(&self) -> RepositoryResult<Vec<BreedingEvent>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM breeding_event ORDER BY rowid", BREEDING_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_breeding_row)?;
        collect_rows("breeding_event", rows)
    }

    /// 按预产期升序
    pub fn list_with_due_date(&self) -> RepositoryResult<Vec<BreedingEvent>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM breeding_event ORDER BY due_date, rowid",
            BREEDING_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_breeding_row)?;
        collect_rows("breeding_event", rows)
    }

    /// 某只母羊的配种记录（最近在前）
    pub fn list_by_goat(&self, goat_id: &str) -> RepositoryResult<Vec<BreedingEvent>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM breeding_event WHERE goat_id = ?1 ORDER BY breeding_date DESC, rowid",
            BREEDING_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![goat_id], map_breeding_row)?;
        collect_rows("breeding_event", rows)
    }

    pub fn delete(&self, breeding_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM breeding_event WHERE breeding_id = ?1",
            params![breeding_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("BreedingEvent", breeding_id));
        }
        Ok(())
    }

    // ===== 产羔记录 =====

    pub fn insert_kidding(&self, record: &KiddingRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO kidding_record (
                kidding_id, breeding_id, dam_id, kidding_date, num_kids_born, num_alive,
                num_stillborn, birth_type, presentation, assisted, complications, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                record.kidding_id,
                record.breeding_id,
                record.dam_id,
                date_to_db(record.kidding_date),
                record.num_kids_born,
                record.num_alive,
                record.num_stillborn,
                record.birth_type.to_db_str(),
                record.presentation.to_db_str(),
                record.assisted,
                record.complications,
                record.notes,
            ],
        )?;
        Ok(())
    }

    /// 全部产羔记录（最近在前）
    pub fn list_kiddings(&self) -> RepositoryResult<Vec<KiddingRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM kidding_record ORDER BY kidding_date DESC, rowid",
            KIDDING_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_kidding_row)?;
        collect_rows("kidding_record", rows)
    }

    pub fn delete_kidding(&self, kidding_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM kidding_record WHERE kidding_id = ?1",
            params![kidding_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("KiddingRecord", kidding_id));
        }
        Ok(())
    }
}

fn map_breeding_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<BreedingEvent>> {
    let breeding_id: String = row.get(0)?;
    let goat_id: String = row.get(1)?;
    let mate_name: String = row.get(2)?;
    let breeding_date_raw: String = row.get(3)?;
    let due_date_raw: String = row.get(4)?;
    let notes: String = row.get(5)?;

    let parse = || -> ParsedRow<BreedingEvent> {
        Ok(BreedingEvent {
            breeding_id,
            goat_id,
            mate_name,
            breeding_date: parse_stored_date("breeding_date", &breeding_date_raw)?,
            due_date: parse_stored_date("due_date", &due_date_raw)?,
            notes,
        })
    };
    Ok(parse())
}

fn map_kidding_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<KiddingRecord>> {
    let kidding_date_raw: String = row.get(3)?;
    let birth_type_raw: String = row.get(7)?;
    let presentation_raw: String = row.get(8)?;

    let record = KiddingRecord {
        kidding_id: row.get(0)?,
        breeding_id: row.get(1)?,
        dam_id: row.get(2)?,
        kidding_date: match parse_stored_date("kidding_date", &kidding_date_raw) {
            Ok(d) => d,
            Err(reason) => return Ok(Err(reason)),
        },
        num_kids_born: row.get(4)?,
        num_alive: row.get(5)?,
        num_stillborn: row.get(6)?,
        birth_type: BirthType::from_db_str(&birth_type_raw),
        presentation: Presentation::from_db_str(&presentation_raw),
        assisted: row.get(9)?,
        complications: row.get(10)?,
        notes: row.get(11)?,
    };
    Ok(Ok(record))
}
