// ==========================================
// GoatOS 牧场记录系统 - 收支流水仓储
// ==========================================
// 职责: finance_transaction 表
// 约束: 关联山羊删除后 goat_id 置空，流水保留
// ==========================================

use crate::domain::derivation::{parse_stored_date, unknown_value};
use crate::domain::types::{TransactionCategory, TransactionType};
use crate::domain::Transaction;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{collect_rows, date_to_db, ParsedRow};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const TRANSACTION_COLUMNS: &str =
    "transaction_id, date, kind, category, amount_cents, description, goat_id";

pub struct FinanceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FinanceRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, txn: &Transaction) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO finance_transaction (
                transaction_id, date, kind, category, amount_cents, description, goat_id
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                txn.transaction_id,
                date_to_db(txn.date),
                txn.kind.to_db_str(),
                txn.category.to_db_str(),
                txn.amount_cents,
                txn.description,
                txn.goat_id,
            ],
        )?;
        Ok(())
    }

    /// 全部流水（日期倒序，同日按录入顺序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Transaction>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM finance_transaction ORDER BY date DESC, rowid",
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_transaction_row)?;
        collect_rows("finance_transaction", rows)
    }

    pub fn delete(&self, transaction_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM finance_transaction WHERE transaction_id = ?1",
            params![transaction_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Transaction", transaction_id));
        }
        Ok(())
    }
}

fn map_transaction_row(row: &Row<'_>) -> rusqlite::Result<ParsedRow<Transaction>> {
    let transaction_id: String = row.get(0)?;
    let date_raw: String = row.get(1)?;
    let kind_raw: String = row.get(2)?;
    let category_raw: String = row.get(3)?;
    let amount_cents: i64 = row.get(4)?;
    let description: String = row.get(5)?;
    let goat_id: Option<String> = row.get(6)?;

    let parse = || -> ParsedRow<Transaction> {
        Ok(Transaction {
            transaction_id,
            date: parse_stored_date("date", &date_raw)?,
            kind: TransactionType::from_db_str(&kind_raw)
                .ok_or_else(|| unknown_value("kind", &kind_raw))?,
            category: TransactionCategory::from_db_str(&category_raw),
            amount_cents,
            description,
            goat_id,
        })
    };
    Ok(parse())
}
