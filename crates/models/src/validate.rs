//! Field-level validation shared by entity inputs.

use rust_decimal::Decimal;

use crate::errors::ModelError;

/// Largest scale stored by `DECIMAL(20, 8)` columns.
pub const AMOUNT_SCALE: u32 = 8;

pub fn validate_name(name: &str, max: usize) -> Result<(), ModelError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ModelError::invalid("name required"));
    }
    if trimmed.chars().count() > max {
        return Err(ModelError::invalid(format!("name longer than {max} characters")));
    }
    Ok(())
}

/// ISO-4217 style code: exactly three ASCII letters, normalized to upper case.
pub fn validate_currency_code(code: &str) -> Result<String, ModelError> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ModelError::invalid("currency code must be three letters"));
    }
    Ok(code.to_ascii_uppercase())
}

pub fn validate_amount(amount: &Decimal) -> Result<(), ModelError> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(ModelError::invalid("amount must be greater than zero"));
    }
    if amount.scale() > AMOUNT_SCALE {
        return Err(ModelError::invalid(format!("amount supports at most {AMOUNT_SCALE} decimal places")));
    }
    Ok(())
}

pub fn validate_destination(destination: &str) -> Result<(), ModelError> {
    let d = destination.trim();
    if d.len() < 4 || d.len() > 256 {
        return Err(ModelError::invalid("destination must be 4..=256 characters"));
    }
    Ok(())
}
