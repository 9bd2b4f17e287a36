// ==========================================
// GoatOS 牧场记录系统 - 医疗记录与周期计划仓储
// ==========================================
// 职责: medical_record / medical_schedule 表
// 约束: 新增医疗记录与推进匹配计划在同一事务内完成
// ==========================================

use crate::domain::derivation::{parse_optional_date, parse_stored_date, unknown_value};
use crate::domain::types::MedicalKind;
use crate::domain::{MedicalEvent, RecurringSchedule, ScheduleTarget};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{collect_rows, date_to_db, opt_date_to_db, ParsedRow};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const RECORD_COLUMNS: &str = "record_id, goat_id, performed_date, kind, notes, next_due_date";
const SCHEDULE_COLUMNS: &str = "schedule_id, goat_id, kind, interval_days, last_performed, notes";

// ==========================================
// MedicalRepository
// ==========================================
pub struct MedicalRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MedicalRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 医疗记录 =====

    /// 新增医疗记录，并推进匹配的周期计划
    ///
    /// 匹配条件: 类型相同，且计划为全群计划或针对该山羊。
    /// 匹配计划的 last_performed 直接改为本次执行日。
    ///
    /// # 返回
    /// - Ok(n): 被推进的计划数量
    pub fn insert_record(&self, event: &MedicalEvent) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO medical_record (
                record_id, goat_id, performed_date, kind, notes, next_due_date
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                event.record_id,
                event.goat_id,
                date_to_db(event.performed_date),
                event.kind.to_db_str(),
                event.notes,
                opt_date_to_db(event.next_due_date),
            ],
        )?;

        let advanced = tx.execute(
            r#"
            UPDATE medical_schedule
            SET last_performed = ?1
            WHERE kind = ?2 AND (goat_id IS NULL OR goat_id = ?3)
            "#,
            params![
                date_to_db(event.performed_date),
                event.kind.to_db_str(),
                event.goat_id,
            ],
        )?;

        tx.commit()?;

        tracing::debug!(
            record_id = %event.record_id,
            kind = %event.kind,
            advanced = advanced,
            "医疗记录已保存"
        );
        Ok(advanced)
    }

    /// 全部医疗记录（最近在前）
    pub fn list_records(&self) -> RepositoryResult<Vec<MedicalEvent>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM medical_record ORDER BY performed_date DESC, rowid",
            RECORD_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_record_row)?;
        collect_rows("medical_record", rows)
    }

    /// 某只山羊的医疗记录
    pub fn list_records_by_goat(&self, goat_id: &str) -> RepositoryResult<Vec<MedicalEvent>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM medical_record WHERE goat_id = ?1 ORDER BY performed_date DESC, rowid",
            RECORD_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![goat_id], map_record_row)?;
        collect_rows("medical_record", rows)
    }

    pub fn delete_record(&self, record_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM medical_record WHERE record_id = ?1",
            params![record_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("MedicalEvent", record_id));
        }
        Ok(())
    }

    // ===== 周期计划 =====

    pub fn insert_schedule(&self, schedule: &RecurringSchedule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO medical_schedule (
                schedule_id, goat_id, kind, interval_days, last_performed, notes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                schedule.schedule_id,
                schedule.target.goat_id(),
                schedule.kind.to_db_str(),
                schedule.interval_days,
                date_to_db(schedule.last_performed),
                schedule.notes,
            ],
        )?;
        Ok(())
    }

    /// 全部周期计划（存储顺序）
    pub fn list_schedules(&self) -> RepositoryResult<Vec<RecurringSchedule>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM medical_schedule ORDER BY rowid", SCHEDULE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_schedule_row)?;
        collect_rows("medical_schedule", rows)
    }

    pub fn delete_schedule(&self, schedule_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM medical_schedule WHERE schedule_id = ?1",
            params![schedule_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("RecurringSchedule", schedule_id));
        }
        Ok(())
    }
}

fn map_record_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<MedicalEvent>> {
    let record_id: String = row.get(0)?;
    let goat_id: String = row.get(1)?;
    let performed_raw: String = row.get(2)?;
    let kind_raw: String = row.get(3)?;
    let notes: String = row.get(4)?;
    let next_due_raw: Option<String> = row.get(5)?;

    let parse = || -> ParsedRow<MedicalEvent> {
        Ok(MedicalEvent {
            record_id,
            goat_id,
            performed_date: parse_stored_date("performed_date", &performed_raw)?,
            kind: MedicalKind::from_db_str(&kind_raw)
                .ok_or_else(|| unknown_value("kind", &kind_raw))?,
            notes,
            next_due_date: parse_optional_date("next_due_date", next_due_raw)?,
        })
    };
    Ok(parse())
}

fn map_schedule_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<RecurringSchedule>> {
    let schedule_id: String = row.get(0)?;
    let goat_id: Option<String> = row.get(1)?;
    let kind_raw: String = row.get(2)?;
    let interval_days: i64 = row.get(3)?;
    let last_raw: String = row.get(4)?;
    let notes: String = row.get(5)?;

    let parse = || -> ParsedRow<RecurringSchedule> {
        Ok(RecurringSchedule {
            schedule_id,
            target: ScheduleTarget::from_goat_id(goat_id),
            kind: MedicalKind::from_db_str(&kind_raw)
                .ok_or_else(|| unknown_value("kind", &kind_raw))?,
            interval_days,
            last_performed: parse_stored_date("last_performed", &last_raw)?,
            notes,
        })
    };
    Ok(parse())
}
