// ==========================================
// GoatOS 牧场记录系统 - 输入校验
// ==========================================
// 职责: 把调用方传入的原始字符串转换为领域值
// 约定: 校验失败统一返回 ApiError::InvalidInput，带字段名
// ==========================================

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::finance::amount_to_cents;
use crate::domain::health_score::{check_body_condition, check_famacha};
use crate::domain::SkipReason;
use crate::domain::types::{Gender, GoatStatus, MedicalKind, MilkingTime, PenType, TransactionType};

/// 解析必填日期 (YYYY-MM-DD)
pub fn parse_date(field: &str, value: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ApiError::InvalidInput(format!("{} 不是合法日期 (YYYY-MM-DD): {}", field, value))
    })
}

/// 解析可选日期；None 或空串视为未填写
pub fn parse_optional_date(field: &str, value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => parse_date(field, v).map(Some),
        _ => Ok(None),
    }
}

/// 必填文本
pub fn require_non_empty(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{} 不能为空", field)));
    }
    Ok(trimmed.to_string())
}

pub fn parse_medical_kind(value: &str) -> ApiResult<MedicalKind> {
    MedicalKind::from_db_str(value)
        .ok_or_else(|| ApiError::InvalidInput(format!("未知的医疗类型: {}", value)))
}

pub fn parse_gender(value: &str) -> ApiResult<Gender> {
    Gender::from_db_str(value)
        .ok_or_else(|| ApiError::InvalidInput(format!("未知的性别: {}", value)))
}

pub fn parse_status(value: &str) -> ApiResult<GoatStatus> {
    GoatStatus::from_db_str(value)
        .ok_or_else(|| ApiError::InvalidInput(format!("未知的健康状态: {}", value)))
}

/// 圈舍类型未知时按通用圈处理
pub fn parse_pen_type(value: &str) -> PenType {
    PenType::from_db_str(value)
}

pub fn parse_transaction_type(value: &str) -> ApiResult<TransactionType> {
    TransactionType::from_db_str(value)
        .ok_or_else(|| ApiError::InvalidInput(format!("未知的收支类型: {}", value)))
}

pub fn parse_milking_time(value: &str) -> ApiResult<MilkingTime> {
    MilkingTime::from_db_str(value)
        .ok_or_else(|| ApiError::InvalidInput(format!("挤奶时段只能是 AM 或 PM: {}", value)))
}

/// 金额（元）→ 分；必须为非负有限数
pub fn parse_amount(field: &str, value: f64) -> ApiResult<i64> {
    amount_to_cents(value)
        .ok_or_else(|| ApiError::InvalidInput(format!("{} 不是合法金额: {}", field, value)))
}

/// FAMACHA 与 BCS 均可不填，填写时必须在合法范围内
pub fn check_scores(famacha: Option<i32>, body_condition: Option<f64>) -> ApiResult<()> {
    let invalid = |reason: SkipReason| ApiError::InvalidInput(reason.to_string());
    if let Some(score) = famacha {
        check_famacha(score).map_err(invalid)?;
    }
    if let Some(score) = body_condition {
        check_body_condition(score).map_err(invalid)?;
    }
    Ok(())
}

/// 非负有限数值
pub fn require_non_negative(field: &str, value: f64) -> ApiResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::InvalidInput(format!("{} 必须为非负数: {}", field, value)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dates() {
        assert_eq!(
            parse_date("date", " 2024-06-01 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert!(matches!(parse_date("date", "June 1"), Err(ApiError::InvalidInput(_))));
        assert_eq!(parse_optional_date("due", Some("")).unwrap(), None);
        assert_eq!(parse_optional_date("due", None).unwrap(), None);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!(parse_medical_kind("deworm").unwrap(), MedicalKind::Deworm);
        assert!(parse_medical_kind("surgery").is_err());
        assert_eq!(parse_pen_type("nonsense"), PenType::General);
        assert!(require_non_negative("qty", f64::NAN).is_err());
        assert!(require_non_empty("name", "  ").is_err());
        assert_eq!(parse_transaction_type(" income ").unwrap(), TransactionType::Income);
        assert!(parse_transaction_type("refund").is_err());
        assert_eq!(parse_milking_time("pm").unwrap(), MilkingTime::Evening);
        assert!(parse_milking_time("noon").is_err());
    }

    #[test]
    fn test_amounts_and_scores() {
        assert_eq!(parse_amount("amount", 12.5).unwrap(), 1250);
        assert!(matches!(parse_amount("amount", -1.0), Err(ApiError::InvalidInput(_))));
        assert!(parse_amount("amount", f64::INFINITY).is_err());
        assert!(check_scores(None, None).is_ok());
        assert!(check_scores(Some(5), Some(2.5)).is_ok());
        assert!(check_scores(Some(0), None).is_err());
        assert!(check_scores(None, Some(2.3)).is_err());
    }
}
