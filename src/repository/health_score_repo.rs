// ==========================================
// GoatOS 牧场记录系统 - 体况评分仓储
// ==========================================
// 职责: health_score 表
// ==========================================

use crate::domain::derivation::parse_stored_date;
use crate::domain::HealthScore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{collect_rows, date_to_db, ParsedRow};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const SCORE_COLUMNS: &str = "score_id, goat_id, date, famacha_score, body_condition_score, notes";

pub struct HealthScoreRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HealthScoreRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, score: &HealthScore) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO health_score (
                score_id, goat_id, date, famacha_score, body_condition_score, notes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                score.score_id,
                score.goat_id,
                date_to_db(score.date),
                score.famacha_score,
                score.body_condition_score,
                score.notes,
            ],
        )?;
        Ok(())
    }

    /// 某只山羊的评分历史（最近在前）
    pub fn list_by_goat(&self, goat_id: &str) -> RepositoryResult<Vec<HealthScore>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM health_score WHERE goat_id = ?1 ORDER BY date DESC, rowid DESC",
            SCORE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![goat_id], map_score_row)?;
        collect_rows("health_score", rows)
    }

    /// 每只山羊最新一条评分
    ///
    /// 同一天多条时取后录入的一条（视为更正）；结果按评分日升序
    pub fn latest_per_goat(&self) -> RepositoryResult<Vec<HealthScore>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {cols} FROM (
                SELECT {cols},
                       ROW_NUMBER() OVER (
                           PARTITION BY goat_id ORDER BY date DESC, rowid DESC
                       ) AS rn,
                       rowid AS rid
                FROM health_score
            )
            WHERE rn = 1
            ORDER BY date, rid
            "#,
            cols = SCORE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_score_row)?;
        collect_rows("health_score", rows)
    }

    pub fn delete(&self, score_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM health_score WHERE score_id = ?1",
            params![score_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("HealthScore", score_id));
        }
        Ok(())
    }
}

fn map_score_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<HealthScore>> {
    let date_raw: String = row.get(2)?;
    let date = match parse_stored_date("date", &date_raw) {
        Ok(d) => d,
        Err(reason) => return Ok(Err(reason)),
    };
    Ok(Ok(HealthScore {
        score_id: row.get(0)?,
        goat_id: row.get(1)?,
        date,
        famacha_score: row.get(3)?,
        body_condition_score: row.get(4)?,
        notes: row.get(5)?,
    }))
}
