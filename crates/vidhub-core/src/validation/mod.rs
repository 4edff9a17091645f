//! Request-shape validation helpers. Every failure is an `AppError::InvalidInput`
//! whose message names the offending field.

use uuid::Uuid;
use validator::ValidateEmail;

use crate::error::AppError;

/// Returns the trimmed value, or a validation error when it is absent or blank.
pub fn require_non_blank(field: &str, value: Option<&str>) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::InvalidInput(format!("{} is required", field))),
    }
}

/// Parses a decimal integer >= 1. Absent values fall back to `default`.
pub fn parse_positive_int(field: &str, raw: Option<&str>, default: i64) -> Result<i64, AppError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(AppError::InvalidInput(format!(
            "{} must be an integer >= 1",
            field
        ))),
    }
}

/// Parses an identifier.
pub fn parse_id(field: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::InvalidInput(format!("{} is not a valid identifier", field)))
}

/// Returns the trimmed, lowercased address. Uses the same rule as `#[validate(email)]`.
pub fn require_email(field: &str, value: Option<&str>) -> Result<String, AppError> {
    let email = require_non_blank(field, value)?.to_lowercase();
    if !email.validate_email() {
        return Err(AppError::InvalidInput(format!(
            "{} must be a valid email address",
            field
        )));
    }
    Ok(email)
}
