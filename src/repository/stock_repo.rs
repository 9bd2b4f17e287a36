// ==========================================
// GoatOS 牧场记录系统 - 饲料与药品库存仓储
// ==========================================
// 职责: feed_item / medicine 表
// 约束: 饲料数量调整后不低于 0
// ==========================================

use crate::domain::derivation::parse_optional_date;
use crate::domain::{FeedItem, Medicine};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{collect_rows, opt_date_to_db, ParsedRow};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const MEDICINE_COLUMNS: &str = "medicine_id, name, batch, expiration_date, quantity, unit, \
                                dosage_amount, dosage_weight_interval, notes";

pub struct StockRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StockRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 饲料 =====

    pub fn insert_feed(&self, item: &FeedItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO feed_item (item_id, name, quantity, unit, low_stock_threshold)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                item.item_id,
                item.name,
                item.quantity,
                item.unit,
                item.low_stock_threshold,
            ],
        )?;
        Ok(())
    }

    /// 全部饲料（存储顺序）
    pub fn list_feed(&self) -> RepositoryResult<Vec<FeedItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT item_id, name, quantity, unit, low_stock_threshold \
             FROM feed_item ORDER BY rowid",
        )?;
        let items = stmt
            .query_map([], |row| {
                Ok(FeedItem {
                    item_id: row.get(0)?,
                    name: row.get(1)?,
                    quantity: row.get(2)?,
                    unit: row.get(3)?,
                    low_stock_threshold: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// 调整饲料数量（正数入库，负数出库），结果不低于 0
    ///
    /// # 返回
    /// - Ok(new_quantity)
    /// - Err(NotFound): 饲料不存在
    pub fn adjust_quantity(&self, item_id: &str, delta: f64) -> RepositoryResult<f64> {
        if !delta.is_finite() {
            return Err(RepositoryError::invalid_value(
                "delta",
                format!("非有限数值: {}", delta),
            ));
        }

        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE feed_item SET quantity = MAX(quantity + ?1, 0) WHERE item_id = ?2",
            params![delta, item_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("FeedItem", item_id));
        }

        let quantity: Option<f64> = conn
            .query_row(
                "SELECT quantity FROM feed_item WHERE item_id = ?1",
                params![item_id],
                |row| row.get(0),
            )
            .optional()?;
        quantity.ok_or_else(|| RepositoryError::not_found("FeedItem", item_id))
    }

    pub fn delete_feed(&self, item_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM feed_item WHERE item_id = ?1", params![item_id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("FeedItem", item_id));
        }
        Ok(())
    }

    // ===== 药品 =====

    pub fn insert_medicine(&self, medicine: &Medicine) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO medicine (
                medicine_id, name, batch, expiration_date, quantity, unit,
                dosage_amount, dosage_weight_interval, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                medicine.medicine_id,
                medicine.name,
                medicine.batch,
                opt_date_to_db(medicine.expiration_date),
                medicine.quantity,
                medicine.unit,
                medicine.dosage_amount,
                medicine.dosage_weight_interval,
                medicine.notes,
            ],
        )?;
        Ok(())
    }

    /// 全部药品（存储顺序）
    pub fn list_medicines(&self) -> RepositoryResult<Vec<Medicine>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM medicine ORDER BY rowid", MEDICINE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_medicine_row)?;
        collect_rows("medicine", rows)
    }

    pub fn delete_medicine(&self, medicine_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM medicine WHERE medicine_id = ?1",
            params![medicine_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Medicine", medicine_id));
        }
        Ok(())
    }
}

fn map_medicine_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<Medicine>> {
    let expiration_raw: Option<String> = row.get(3)?;
    let expiration_date = match parse_optional_date("expiration_date", expiration_raw) {
        Ok(d) => d,
        Err(reason) => return Ok(Err(reason)),
    };
    Ok(Ok(Medicine {
        medicine_id: row.get(0)?,
        name: row.get(1)?,
        batch: row.get(2)?,
        expiration_date,
        quantity: row.get(4)?,
        unit: row.get(5)?,
        dosage_amount: row.get(6)?,
        dosage_weight_interval: row.get(7)?,
        notes: row.get(8)?,
    }))
}
