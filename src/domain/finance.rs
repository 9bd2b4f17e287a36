// ==========================================
// GoatOS 牧场记录系统 - 收支领域模型
// ==========================================
// 职责: 收支流水 + 汇总（累计与本月）
// 约定: 金额以"分"为单位的整数保存，汇总不受浮点误差影响
// ==========================================

use crate::domain::types::{TransactionCategory, TransactionType};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ==========================================
// Transaction - 收支流水
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub kind: TransactionType,
    pub category: TransactionCategory,
    pub amount_cents: i64,
    pub description: String,
    pub goat_id: Option<String>, // 可选关联山羊；山羊删除后置空
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        kind: TransactionType,
        category: TransactionCategory,
        amount_cents: i64,
        description: String,
        goat_id: Option<String>,
    ) -> Self {
        Self {
            transaction_id: uuid::Uuid::new_v4().to_string(),
            date,
            kind,
            category,
            amount_cents,
            description,
            goat_id,
        }
    }
}

/// 金额 → 分；负数、非有限数或超出范围时返回 None
pub fn amount_to_cents(amount: f64) -> Option<i64> {
    let cents = (amount * 100.0).round();
    if !cents.is_finite() || cents < 0.0 || cents > i64::MAX as f64 {
        return None;
    }
    Some(cents as i64)
}

/// 分 → "12.50"
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

// ==========================================
// FinanceSummary - 收支汇总
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceSummary {
    pub total_income_cents: i64,
    pub total_expense_cents: i64,
    pub net_profit_cents: i64,
    /// 本月 = 日期不早于 today 所在月的 1 日
    pub month_income_cents: i64,
    pub month_expense_cents: i64,
}

impl FinanceSummary {
    /// 汇总流水；累加溢出时饱和
    pub fn from_transactions(today: NaiveDate, transactions: &[Transaction]) -> Self {
        let month_start = today.with_day(1).unwrap_or(today);
        let mut summary = FinanceSummary::default();

        for t in transactions {
            let this_month = t.date >= month_start;
            match t.kind {
                TransactionType::Income => {
                    summary.total_income_cents =
                        summary.total_income_cents.saturating_add(t.amount_cents);
                    if this_month {
                        summary.month_income_cents =
                            summary.month_income_cents.saturating_add(t.amount_cents);
                    }
                }
                TransactionType::Expense => {
                    summary.total_expense_cents =
                        summary.total_expense_cents.saturating_add(t.amount_cents);
                    if this_month {
                        summary.month_expense_cents =
                            summary.month_expense_cents.saturating_add(t.amount_cents);
                    }
                }
            }
        }

        summary.net_profit_cents = summary
            .total_income_cents
            .saturating_sub(summary.total_expense_cents);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn txn(date: NaiveDate, kind: TransactionType, cents: i64) -> Transaction {
        Transaction::new(date, kind, TransactionCategory::Other, cents, String::new(), None)
    }

    #[test]
    fn test_summary_month_starts_on_first() {
        let today = d(2024, 6, 15);
        let transactions = vec![
            txn(d(2024, 5, 31), TransactionType::Income, 10_000),
            txn(d(2024, 6, 1), TransactionType::Income, 2_550),
            txn(d(2024, 6, 10), TransactionType::Expense, 4_000),
            txn(d(2024, 3, 2), TransactionType::Expense, 1_000),
        ];
        let summary = FinanceSummary::from_transactions(today, &transactions);
        assert_eq!(summary.total_income_cents, 12_550);
        assert_eq!(summary.total_expense_cents, 5_000);
        assert_eq!(summary.net_profit_cents, 7_550);
        assert_eq!(summary.month_income_cents, 2_550);
        assert_eq!(summary.month_expense_cents, 4_000);
    }

    #[test]
    fn test_cents_conversion() {
        assert_eq!(amount_to_cents(12.5), Some(1250));
        assert_eq!(amount_to_cents(0.1 + 0.2), Some(30));
        assert_eq!(amount_to_cents(-1.0), None);
        assert_eq!(amount_to_cents(f64::INFINITY), None);
        assert_eq!(format_cents(1250), "12.50");
        assert_eq!(format_cents(-705), "-7.05");
        assert_eq!(format_cents(0), "0.00");
    }
}
