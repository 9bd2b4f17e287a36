// ==========================================
// GoatOS 牧场记录系统 - 放牧区与轮牧仓储
// ==========================================
// 职责: grazing_area / pasture_assignment / pasture_assignment_goat 表
// 说明: 坐标以原始 JSON 文本存取，解析由调用方按需进行
// ==========================================

use crate::domain::derivation::{parse_optional_date, parse_stored_date};
use crate::domain::{GrazingArea, PastureAssignment};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{collect_rows, date_to_db, opt_date_to_db, ParsedRow};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const ASSIGNMENT_COLUMNS: &str = "assignment_id, area_id, start_date, end_date, notes";

pub struct PastureRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PastureRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 放牧区 =====

    pub fn insert(&self, area: &GrazingArea) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO grazing_area (area_id, name, color, coordinates) VALUES (?1, ?2, ?3, ?4)",
            params![area.area_id, area.name, area.color, area.coordinates],
        )?;
        Ok(())
    }

    /// 全部放牧区（存储顺序）
    pub fn list_all(&self) -> RepositoryResult<Vec<GrazingArea>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT area_id, name, color, coordinates FROM grazing_area ORDER BY rowid",
        )?;
        let areas = stmt
            .query_map([], |row| {
                Ok(GrazingArea {
                    area_id: row.get(0)?,
                    name: row.get(1)?,
                    color: row.get(2)?,
                    coordinates: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(areas)
    }

    pub fn delete(&self, area_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected =
            conn.execute("DELETE FROM grazing_area WHERE area_id = ?1", params![area_id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("GrazingArea", area_id));
        }
        Ok(())
    }

    // ===== 轮牧 =====

    /// 新建轮牧记录及其山羊名单（同一事务）
    pub fn insert_assignment(&self, assignment: &PastureAssignment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO pasture_assignment (assignment_id, area_id, start_date, end_date, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                assignment.assignment_id,
                assignment.area_id,
                date_to_db(assignment.start_date),
                opt_date_to_db(assignment.end_date),
                assignment.notes,
            ],
        )?;
        for goat_id in &assignment.goat_ids {
            tx.execute(
                "INSERT INTO pasture_assignment_goat (assignment_id, goat_id) VALUES (?1, ?2)",
                params![assignment.assignment_id, goat_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// 结束轮牧（写入结束日）
    pub fn end_assignment(&self, assignment_id: &str, end_date: NaiveDate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE pasture_assignment SET end_date = ?1 WHERE assignment_id = ?2",
            params![date_to_db(end_date), assignment_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("PastureAssignment", assignment_id));
        }
        Ok(())
    }

    /// 某放牧区的全部轮牧记录（开始日倒序）
    pub fn list_assignments_for_area(
        &self,
        area_id: &str,
    ) -> RepositoryResult<Vec<PastureAssignment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM pasture_assignment WHERE area_id = ?1 \
             ORDER BY start_date DESC, rowid DESC",
            ASSIGNMENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![area_id], map_assignment_row)?;
        let mut assignments = collect_rows("pasture_assignment", rows)?;

        let mut goats = conn.prepare(
            "SELECT goat_id FROM pasture_assignment_goat WHERE assignment_id = ?1 ORDER BY rowid",
        )?;
        for assignment in &mut assignments {
            assignment.goat_ids = goats
                .query_map(params![assignment.assignment_id], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
        }
        Ok(assignments)
    }
}

fn map_assignment_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<PastureAssignment>> {
    let assignment_id: String = row.get(0)?;
    let area_id: String = row.get(1)?;
    let start_raw: String = row.get(2)?;
    let end_raw: Option<String> = row.get(3)?;
    let notes: String = row.get(4)?;

    let parse = || -> ParsedRow<PastureAssignment> {
        Ok(PastureAssignment {
            assignment_id,
            area_id,
            goat_ids: Vec::new(),
            start_date: parse_stored_date("start_date", &start_raw)?,
            end_date: parse_optional_date("end_date", end_raw)?,
            notes,
        })
    };
    Ok(parse())
}
