// ==========================================
// GoatOS 牧场记录系统 - 山羊档案仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::derivation::{parse_optional_date, unknown_value};
use crate::domain::types::{Gender, GoatStatus};
use crate::domain::{Goat, MeatHarvest};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{collect_rows, opt_date_to_db, require_parsed, ParsedRow};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const GOAT_COLUMNS: &str = "goat_id, name, breed, gender, status, birthdate, approx_age_years, \
                            is_fainting, dam_id, sire_id, bio";

// ==========================================
// GoatRepository - 山羊档案仓储
// ==========================================
/// 职责: 管理 goat / meat_harvest 表
pub struct GoatRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GoatRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增档案
    pub fn insert(&self, goat: &Goat) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO goat (
                goat_id, name, breed, gender, status, birthdate, approx_age_years,
                is_fainting, dam_id, sire_id, bio
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                goat.goat_id,
                goat.name,
                goat.breed,
                goat.gender.to_db_str(),
                goat.status.to_db_str(),
                opt_date_to_db(goat.birthdate),
                goat.approx_age_years,
                goat.is_fainting,
                goat.dam_id,
                goat.sire_id,
                goat.bio,
            ],
        )?;
        Ok(())
    }

    /// 按 ID 查询
    ///
    /// # 返回
    /// - Ok(None): 未找到
    /// - Err(UnreadableRow): 存储数据无法解析
    pub fn find_by_id(&self, goat_id: &str) -> RepositoryResult<Option<Goat>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM goat WHERE goat_id = ?1", GOAT_COLUMNS);
        let row = conn.query_row(&sql, params![goat_id], map_goat_row).optional()?;
        row.map(|r| require_parsed("goat", r)).transpose()
    }

    /// 全部档案（按名称排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Goat>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM goat ORDER BY name, rowid", GOAT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_goat_row)?;
        collect_rows("goat", rows)
    }

    /// 母羊档案 (Doe / Doeling)
    pub fn list_does(&self) -> RepositoryResult<Vec<Goat>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|g| g.gender.is_female())
            .collect())
    }

    /// 更新健康状态
    pub fn update_status(&self, goat_id: &str, status: GoatStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE goat SET status = ?1 WHERE goat_id = ?2",
            params![status.to_db_str(), goat_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Goat", goat_id));
        }
        Ok(())
    }

    /// 删除档案（关联记录级联删除）
    pub fn delete(&self, goat_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM goat WHERE goat_id = ?1", params![goat_id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Goat", goat_id));
        }
        Ok(())
    }

    /// 记录屠宰数据（每只山羊一条，重复记录覆盖）
    pub fn record_harvest(&self, harvest: &MeatHarvest) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO meat_harvest (goat_id, live_weight, hanging_weight)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(goat_id) DO UPDATE SET
                live_weight = excluded.live_weight,
                hanging_weight = excluded.hanging_weight
            "#,
            params![harvest.goat_id, harvest.live_weight, harvest.hanging_weight],
        )?;
        Ok(())
    }

    pub fn find_harvest(&self, goat_id: &str) -> RepositoryResult<Option<MeatHarvest>> {
        let conn = self.get_conn()?;
        let harvest = conn
            .query_row(
                "SELECT goat_id, live_weight, hanging_weight FROM meat_harvest WHERE goat_id = ?1",
                params![goat_id],
                |row| {
                    Ok(MeatHarvest {
                        goat_id: row.get(0)?,
                        live_weight: row.get(1)?,
                        hanging_weight: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(harvest)
    }
}

fn map_goat_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<Goat>> {
    let gender_raw: String = row.get(3)?;
    let status_raw: String = row.get(4)?;
    let birthdate_raw: Option<String> = row.get(5)?;

    let goat_id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let breed: String = row.get(2)?;
    let approx_age_years: i32 = row.get(6)?;
    let is_fainting: bool = row.get(7)?;
    let dam_id: Option<String> = row.get(8)?;
    let sire_id: Option<String> = row.get(9)?;
    let bio: String = row.get(10)?;

    let parse = || -> ParsedRow<Goat> {
        Ok(Goat {
            goat_id,
            name,
            breed,
            gender: Gender::from_db_str(&gender_raw)
                .ok_or_else(|| unknown_value("gender", &gender_raw))?,
            status: GoatStatus::from_db_str(&status_raw)
                .ok_or_else(|| unknown_value("status", &status_raw))?,
            birthdate: parse_optional_date("birthdate", birthdate_raw)?,
            approx_age_years,
            is_fainting,
            dam_id,
            sire_id,
            bio,
        })
    };
    Ok(parse())
}
