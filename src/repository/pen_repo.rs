// ==========================================
// GoatOS 牧场记录系统 - 圈舍仓储
// ==========================================
// 职责: pen / pen_assignment 表
// 约束: 一只山羊同一时间最多一条未出圈记录
// ==========================================

use crate::domain::derivation::{parse_optional_date, parse_stored_date};
use crate::domain::types::PenType;
use crate::domain::{Pen, PenAssignment, PenOccupancy};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{collect_rows, date_to_db, ParsedRow};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const PEN_COLUMNS: &str = "pen_id, name, pen_type, capacity, notes";
const ASSIGNMENT_COLUMNS: &str = "assignment_id, pen_id, goat_id, date_in, date_out, notes";

pub struct PenRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PenRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 圈舍 =====

    pub fn insert_pen(&self, pen: &Pen) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO pen (pen_id, name, pen_type, capacity, notes) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                pen.pen_id,
                pen.name,
                pen.pen_type.to_db_str(),
                pen.capacity,
                pen.notes,
            ],
        )?;
        Ok(())
    }

    /// 全部圈舍（存储顺序）
    pub fn list_pens(&self) -> RepositoryResult<Vec<Pen>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM pen ORDER BY rowid", PEN_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let pens = stmt
            .query_map([], map_pen_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pens)
    }

    pub fn delete_pen(&self, pen_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM pen WHERE pen_id = ?1", params![pen_id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Pen", pen_id));
        }
        Ok(())
    }

    // ===== 入圈/出圈 =====

    /// 山羊入圈
    ///
    /// 同一事务内先结束该山羊的在圈记录 (date_out = date_in)，再写入新记录
    pub fn assign(&self, assignment: &PenAssignment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let closed = tx.execute(
            "UPDATE pen_assignment SET date_out = ?1 WHERE goat_id = ?2 AND date_out IS NULL",
            params![date_to_db(assignment.date_in), assignment.goat_id],
        )?;

        tx.execute(
            r#"
            INSERT INTO pen_assignment (assignment_id, pen_id, goat_id, date_in, date_out, notes)
            VALUES (?1, ?2, ?3, ?4, NULL, ?5)
            "#,
            params![
                assignment.assignment_id,
                assignment.pen_id,
                assignment.goat_id,
                date_to_db(assignment.date_in),
                assignment.notes,
            ],
        )?;

        tx.commit()?;

        if closed > 0 {
            tracing::debug!(goat_id = %assignment.goat_id, closed = closed, "已结束原在圈记录");
        }
        Ok(())
    }

    /// 山羊出圈
    ///
    /// # 返回
    /// - Ok(n): 被结束的在圈记录数 (0 表示本来不在圈)
    pub fn remove(&self, goat_id: &str, date_out: NaiveDate) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let closed = conn.execute(
            "UPDATE pen_assignment SET date_out = ?1 WHERE goat_id = ?2 AND date_out IS NULL",
            params![date_to_db(date_out), goat_id],
        )?;
        Ok(closed)
    }

    /// 在圈记录（未出圈）
    pub fn list_active_assignments(&self) -> RepositoryResult<Vec<PenAssignment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM pen_assignment WHERE date_out IS NULL ORDER BY rowid",
            ASSIGNMENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_assignment_row)?;
        collect_rows("pen_assignment", rows)
    }

    /// 各圈舍当前占用（圈舍存储顺序）
    ///
    /// 在圈数直接在库内统计 date_out IS NULL 的记录，入圈日期是否可解析不影响计数
    pub fn list_occupancy(&self) -> RepositoryResult<Vec<PenOccupancy>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {cols},
                   (SELECT COUNT(*) FROM pen_assignment a
                    WHERE a.pen_id = pen.pen_id AND a.date_out IS NULL) AS active_count
            FROM pen
            ORDER BY pen.rowid
            "#,
            cols = PEN_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let occupancy = stmt
            .query_map([], |row| {
                Ok(PenOccupancy {
                    pen: map_pen_row(row)?,
                    active_count: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(occupancy)
    }
}

/// 圈舍类型未知时按通用圈处理，不跳过
fn map_pen_row(row: &Row<'_>) -> rusqlite::Result<Pen> {
    Ok(Pen {
        pen_id: row.get(0)?,
        name: row.get(1)?,
        pen_type: PenType::from_db_str(&row.get::<_, String>(2)?),
        capacity: row.get(3)?,
        notes: row.get(4)?,
    })
}

fn map_assignment_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<PenAssignment>> {
    let assignment_id: String = row.get(0)?;
    let pen_id: String = row.get(1)?;
    let goat_id: String = row.get(2)?;
    let date_in_raw: String = row.get(3)?;
    let date_out_raw: Option<String> = row.get(4)?;
    let notes: String = row.get(5)?;

    let parse = || -> ParsedRow<PenAssignment> {
        Ok(PenAssignment {
            assignment_id,
            pen_id,
            goat_id,
            date_in: parse_stored_date("date_in", &date_in_raw)?,
            date_out: parse_optional_date("date_out", date_out_raw)?,
            notes,
        })
    };
    Ok(parse())
}
