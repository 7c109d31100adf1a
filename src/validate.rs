//! Caller-side input checks. The record store assumes validated input.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("credit hours `{0}` is not a number")]
    CreditHoursNotNumeric(String),
    #[error("credit hours must be greater than zero, got {0}")]
    CreditHoursNotPositive(f64),
}

pub fn parse_name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

pub fn parse_credit_hours(raw: &str) -> Result<f64, ValidationError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::CreditHoursNotNumeric(raw.to_string()))?;
    check_credit_hours(value)
}

pub fn check_credit_hours(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::CreditHoursNotNumeric(value.to_string()));
    }
    if value <= 0.0 {
        return Err(ValidationError::CreditHoursNotPositive(value));
    }
    Ok(value)
}
