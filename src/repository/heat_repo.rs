// ==========================================
// GoatOS 牧场记录系统 - 发情观察仓储
// ==========================================

use crate::domain::derivation::parse_stored_date;
use crate::domain::HeatObservation;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{collect_rows, date_to_db, ParsedRow};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const HEAT_COLUMNS: &str = "observation_id, goat_id, observed_date, signs, notes";

pub struct HeatRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HeatRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, obs: &HeatObservation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO heat_observation (observation_id, goat_id, observed_date, signs, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                obs.observation_id,
                obs.goat_id,
                date_to_db(obs.observed_date),
                obs.signs,
                obs.notes,
            ],
        )?;
        Ok(())
    }

    /// 全部观察（最近在前）
    pub fn list_all(&self) -> RepositoryResult<Vec<HeatObservation>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM heat_observation ORDER BY observed_date DESC, rowid",
            HEAT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_heat_row)?;
        collect_rows("heat_observation", rows)
    }

    /// 每只母羊 (DOE / DOELING) 最新一条观察
    ///
    /// 公羊、阉羊的观察不参与；同一天多条时取先录入的一条；结果按观察日升序
    pub fn latest_per_doe(&self) -> RepositoryResult<Vec<HeatObservation>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {cols} FROM (
                SELECT h.observation_id, h.goat_id, h.observed_date, h.signs, h.notes,
                       ROW_NUMBER() OVER (
                           PARTITION BY h.goat_id ORDER BY h.observed_date DESC, h.rowid ASC
                       ) AS rn,
                       h.rowid AS rid
                FROM heat_observation h
                JOIN goat g ON g.goat_id = h.goat_id
                WHERE UPPER(TRIM(g.gender)) IN ('DOE', 'DOELING')
            )
            WHERE rn = 1
            ORDER BY observed_date, rid
            "#,
            cols = HEAT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_heat_row)?;
        collect_rows("heat_observation", rows)
    }

    pub fn delete(&self, observation_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM heat_observation WHERE observation_id = ?1",
            params![observation_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("HeatObservation", observation_id));
        }
        Ok(())
    }
}

fn map_heat_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<HeatObservation>> {
    let observed_raw: String = row.get(2)?;
    let observed_date = match parse_stored_date("observed_date", &observed_raw) {
        Ok(d) => d,
        Err(reason) => return Ok(Err(reason)),
    };
    Ok(Ok(HeatObservation {
        observation_id: row.get(0)?,
        goat_id: row.get(1)?,
        observed_date,
        signs: row.get(3)?,
        notes: row.get(4)?,
    }))
}
