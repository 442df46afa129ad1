//! Validation utilities for the Hardware Inventory platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Movement Quantities
// ============================================================================

/// A quantity as submitted by a client: either a JSON number or form text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuantityInput {
    Number(serde_json::Number),
    Text(String),
}

impl From<i64> for QuantityInput {
    fn from(n: i64) -> Self {
        QuantityInput::Number(n.into())
    }
}

impl From<&str> for QuantityInput {
    fn from(s: &str) -> Self {
        QuantityInput::Text(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("Quantity must be a number")]
    NotANumber,
    #[error("Quantity must be a whole number")]
    NotAnInteger,
    #[error("Quantity must be greater than zero")]
    NotPositive,
    #[error("Quantity is too large")]
    TooLarge,
}

impl QuantityInput {
    /// Parse into a positive whole quantity
    pub fn parse(&self) -> Result<i64, QuantityError> {
        let value = match self {
            QuantityInput::Number(n) => number_to_whole(n)?,
            QuantityInput::Text(s) => text_to_whole(s.trim())?,
        };
        if value <= 0 {
            return Err(QuantityError::NotPositive);
        }
        Ok(value)
    }
}

fn number_to_whole(n: &serde_json::Number) -> Result<i64, QuantityError> {
    if let Some(v) = n.as_i64() {
        return Ok(v);
    }
    if n.as_u64().is_some() {
        return Err(QuantityError::TooLarge);
    }
    n.as_f64()
        .ok_or(QuantityError::NotANumber)
        .and_then(float_to_whole)
}

fn text_to_whole(s: &str) -> Result<i64, QuantityError> {
    if s.is_empty() {
        return Err(QuantityError::NotANumber);
    }
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => float_to_whole(f),
        _ => Err(QuantityError::NotANumber),
    }
}

fn float_to_whole(f: f64) -> Result<i64, QuantityError> {
    if !f.is_finite() {
        return Err(QuantityError::NotANumber);
    }
    if f.fract() != 0.0 {
        return Err(QuantityError::NotAnInteger);
    }
    if f.abs() > i64::MAX as f64 {
        return Err(QuantityError::TooLarge);
    }
    Ok(f as i64)
}

// ============================================================================
// Item Validations
// ============================================================================

pub const MAX_PRODUCT_CODE_LEN: usize = 32;

/// Validate product code format (1-32 chars, alphanumeric, '-' or '_')
pub fn validate_product_code(code: &str) -> Result<(), &'static str> {
    let code = code.trim();
    if code.is_empty() {
        return Err("Product code is required");
    }
    if code.len() > MAX_PRODUCT_CODE_LEN {
        return Err("Product code must be at most 32 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("Product code may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}

/// Validate item name is present
pub fn validate_item_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Item name is required");
    }
    Ok(())
}

/// Validate a stock count or threshold is not negative
pub fn validate_stock_level(level: i64) -> Result<(), &'static str> {
    if level < 0 {
        return Err("Stock levels cannot be negative");
    }
    Ok(())
}

/// Validate a price or cost is not negative
pub fn validate_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amounts cannot be negative");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(json: &str) -> QuantityInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_quantity_accepts_positive_integers() {
        assert_eq!(QuantityInput::from(5).parse(), Ok(5));
        assert_eq!(QuantityInput::from("12").parse(), Ok(12));
        assert_eq!(QuantityInput::from(" 7 ").parse(), Ok(7));
        assert_eq!(number("3.0").parse(), Ok(3));
    }

    #[test]
    fn test_quantity_rejects_zero_and_negative() {
        assert_eq!(QuantityInput::from(0).parse(), Err(QuantityError::NotPositive));
        assert_eq!(QuantityInput::from(-4).parse(), Err(QuantityError::NotPositive));
        assert_eq!(QuantityInput::from("-1").parse(), Err(QuantityError::NotPositive));
    }

    #[test]
    fn test_quantity_rejects_fractions() {
        assert_eq!(number("2.5").parse(), Err(QuantityError::NotAnInteger));
        assert_eq!(QuantityInput::from("2.5").parse(), Err(QuantityError::NotAnInteger));
    }

    #[test]
    fn test_quantity_rejects_non_numeric() {
        assert_eq!(QuantityInput::from("abc").parse(), Err(QuantityError::NotANumber));
        assert_eq!(QuantityInput::from("").parse(), Err(QuantityError::NotANumber));
        assert_eq!(QuantityInput::from("NaN").parse(), Err(QuantityError::NotANumber));
        assert!(serde_json::from_str::<QuantityInput>("true").is_err());
    }

    #[test]
    fn test_quantity_rejects_oversized() {
        assert_eq!(number("18446744073709551615").parse(), Err(QuantityError::TooLarge));
    }

    #[test]
    fn test_product_code() {
        assert!(validate_product_code("PNT-001").is_ok());
        assert!(validate_product_code("tool_42").is_ok());
        assert!(validate_product_code("").is_err());
        assert!(validate_product_code("has space").is_err());
        assert!(validate_product_code(&"X".repeat(33)).is_err());
    }

    #[test]
    fn test_levels_and_amounts() {
        assert!(validate_stock_level(0).is_ok());
        assert!(validate_stock_level(-1).is_err());
        assert!(validate_amount(Decimal::ZERO).is_ok());
        assert!(validate_amount(Decimal::new(-1, 2)).is_err());
        assert!(validate_item_name("  ").is_err());
    }
}
