//! Monetary amount value object.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::config::{MONEY_INTEGER_DIGITS, MONEY_SCALE};
use crate::errors::{AppError, AppResult};

/// Whether `value` is storable in a money column without rounding or
/// overflow: at most `MONEY_SCALE` decimals and `MONEY_INTEGER_DIGITS`
/// integer digits.
pub fn fits_money_column(value: Decimal) -> bool {
    let limit = Decimal::from(10_i64.pow(MONEY_INTEGER_DIGITS));
    value.normalize().scale() <= MONEY_SCALE && value.abs() < limit
}

/// A strictly positive monetary amount with at most two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    /// Validate a decimal as a debit/credit amount.
    ///
    /// # Errors
    /// `InvalidAmount` for zero, negative, over-precise or oversized values.
    pub fn new(value: Decimal) -> AppResult<Self> {
        if value <= Decimal::ZERO || !fits_money_column(value) {
            return Err(AppError::InvalidAmount);
        }
        Ok(Self(value.normalize()))
    }

    /// Parse an amount from an untyped JSON value.
    ///
    /// Accepts JSON numbers and numeric strings; everything else
    /// (null, booleans, objects, non-numeric text) is `InvalidAmount`.
    pub fn from_json(value: &Value) -> AppResult<Self> {
        let decimal = match value {
            Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    Decimal::from(int)
                } else if let Some(float) = number.as_f64() {
                    Decimal::try_from(float).map_err(|_| AppError::InvalidAmount)?
                } else {
                    return Err(AppError::InvalidAmount);
                }
            }
            Value::String(text) => {
                Decimal::from_str(text.trim()).map_err(|_| AppError::InvalidAmount)?
            }
            _ => return Err(AppError::InvalidAmount),
        };

        Self::new(decimal)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positive_amounts_accepted() {
        assert_eq!(Amount::new(Decimal::from(200)).unwrap().value(), Decimal::from(200));
        assert_eq!(
            Amount::new(Decimal::new(1050, 2)).unwrap().to_string(),
            "10.5"
        );
    }

    #[test]
    fn test_zero_and_negative_rejected() {
        assert!(matches!(Amount::new(Decimal::ZERO), Err(AppError::InvalidAmount)));
        assert!(matches!(Amount::new(Decimal::from(-5)), Err(AppError::InvalidAmount)));
    }

    #[test]
    fn test_sub_cent_precision_rejected() {
        assert!(matches!(
            Amount::new(Decimal::new(1001, 3)),
            Err(AppError::InvalidAmount)
        ));
        // Trailing zeros do not count as precision
        assert!(Amount::new(Decimal::new(1000, 3)).is_ok());
    }

    #[test]
    fn test_money_column_bounds() {
        assert!(fits_money_column(Decimal::from_str("999999999999999999.99").unwrap()));
        assert!(!fits_money_column(Decimal::from(1_000_000_000_000_000_000_i64)));
        assert!(!fits_money_column(Decimal::new(1, 3)));
        assert!(matches!(
            Amount::new(Decimal::from(1_000_000_000_000_000_000_i64)),
            Err(AppError::InvalidAmount)
        ));
    }

    #[test]
    fn test_from_json_numbers_and_strings() {
        assert_eq!(Amount::from_json(&json!(60)).unwrap().value(), Decimal::from(60));
        assert_eq!(
            Amount::from_json(&json!(12.5)).unwrap().value(),
            Decimal::new(125, 1)
        );
        assert_eq!(
            Amount::from_json(&json!(" 200.25 ")).unwrap().value(),
            Decimal::new(20025, 2)
        );
    }

    #[test]
    fn test_from_json_rejects_non_numeric() {
        for value in [json!("abc"), json!(null), json!(true), json!({"amount": 1}), json!([1])] {
            assert!(
                matches!(Amount::from_json(&value), Err(AppError::InvalidAmount)),
                "{value} should be rejected"
            );
        }
        assert!(matches!(Amount::from_json(&json!(0)), Err(AppError::InvalidAmount)));
        assert!(matches!(Amount::from_json(&json!("-3")), Err(AppError::InvalidAmount)));
    }
}
