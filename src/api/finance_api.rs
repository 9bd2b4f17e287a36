// ==========================================
// GoatOS 牧场记录系统 - 收支 API
// ==========================================
// 职责: 收支流水录入、列表、汇总
// 约定: 金额以元为单位传入，内部按分保存
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{parse_amount, parse_date, parse_transaction_type};
use crate::domain::types::TransactionCategory;
use crate::domain::{FinanceSummary, Transaction};
use crate::repository::{FinanceRepository, GoatRepository};

/// 收支录入参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionInput {
    pub date: String,
    /// INCOME / EXPENSE
    pub kind: String,
    /// 未知分类归为 Other
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub goat_id: Option<String>,
}

pub struct FinanceApi {
    goat_repo: Arc<GoatRepository>,
    finance_repo: Arc<FinanceRepository>,
}

impl FinanceApi {
    pub fn new(goat_repo: Arc<GoatRepository>, finance_repo: Arc<FinanceRepository>) -> Self {
        Self {
            goat_repo,
            finance_repo,
        }
    }

    /// 录入一笔收支
    ///
    /// # 返回
    /// - Err(InvalidInput): 类型未知、金额为负或不是有限数、日期非法
    /// - Err(NotFound): 关联的山羊不存在
    pub fn record_transaction(&self, input: &TransactionInput) -> ApiResult<Transaction> {
        let goat_id = input
            .goat_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        if let Some(id) = goat_id.as_deref() {
            if self.goat_repo.find_by_id(id)?.is_none() {
                return Err(ApiError::NotFound(format!("Goat(id={})不存在", id)));
            }
        }

        let txn = Transaction::new(
            parse_date("date", &input.date)?,
            parse_transaction_type(&input.kind)?,
            TransactionCategory::from_db_str(&input.category),
            parse_amount("amount", input.amount)?,
            input.description.clone(),
            goat_id,
        );
        self.finance_repo.insert(&txn)?;
        tracing::info!(
            transaction_id = %txn.transaction_id,
            kind = %txn.kind,
            amount_cents = txn.amount_cents,
            "收支流水已录入"
        );
        Ok(txn)
    }

    /// 全部流水（最近在前）
    pub fn list_transactions(&self) -> ApiResult<Vec<Transaction>> {
        Ok(self.finance_repo.list_all()?)
    }

    /// 累计与本月收支
    pub fn summary(&self, today: NaiveDate) -> ApiResult<FinanceSummary> {
        let transactions = self.finance_repo.list_all()?;
        Ok(FinanceSummary::from_transactions(today, &transactions))
    }

    pub fn delete_transaction(&self, transaction_id: &str) -> ApiResult<()> {
        self.finance_repo.delete(transaction_id)?;
        Ok(())
    }
}
