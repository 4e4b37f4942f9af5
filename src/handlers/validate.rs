use crate::database::models::OPERATIONAL_DAYS;
use crate::error::ApiError;

/// Required string field; whitespace-only counts as empty
pub fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid_field(field, "is required"));
    }
    Ok(())
}

pub fn require_positive(field: &str, value: i32) -> Result<(), ApiError> {
    if value <= 0 {
        return Err(ApiError::invalid_field(field, "must be greater than zero"));
    }
    Ok(())
}

/// Stock counts and prices may be zero but never negative
pub fn require_non_negative(field: &str, value: impl Into<i64>) -> Result<(), ApiError> {
    if value.into() < 0 {
        return Err(ApiError::invalid_field(field, "must not be negative"));
    }
    Ok(())
}

/// Operational days must be non-empty and use the Indonesian day names
pub fn validate_days(days: &[String]) -> Result<(), ApiError> {
    if days.is_empty() {
        return Err(ApiError::invalid_field("day_operational", "at least one day is required"));
    }
    if let Some(day) = days.iter().find(|day| !OPERATIONAL_DAYS.contains(&day.as_str())) {
        return Err(ApiError::invalid_field(
            "day_operational",
            format!("unknown day '{}', expected one of: {}", day, OPERATIONAL_DAYS.join(", ")),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("email", "  ").is_err());
        assert!(require_text("email", "a@b.co").is_ok());
    }

    #[test]
    fn quantity_must_be_positive() {
        assert!(require_positive("quantity", 0).is_err());
        assert!(require_positive("quantity", 3).is_ok());
    }

    #[test]
    fn prices_and_stock_reject_negatives() {
        assert!(require_non_negative("min_retail_price", 0i64).is_ok());
        assert!(require_non_negative("quantity", 12i32).is_ok());

        let err = require_non_negative("buy_price", -1i64).unwrap_err();
        assert_eq!(err.to_json()["field_errors"]["buy_price"], "must not be negative");
    }

    #[test]
    fn days_are_checked_against_calendar() {
        let ok = vec!["senin".to_string(), "jum'at".to_string()];
        assert!(validate_days(&ok).is_ok());
        assert!(validate_days(&[]).is_err());

        let err = validate_days(&["monday".to_string()]).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_json()["field_errors"]["day_operational"]
            .as_str()
            .unwrap()
            .contains("monday"));
    }
}
