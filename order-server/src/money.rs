//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` for storage/serialization.

use rust_decimal::prelude::*;
use shared::error::{AppError, AppResult};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item (€1,000,000)
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per item
const MAX_QUANTITY: i32 = 999;

/// Convert f64 to Decimal
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Convert Decimal back to f64, rounded to 2 decimal places
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp(DECIMAL_PLACES)
        .to_f64()
        .unwrap_or(0.0)
}

/// Validate a line item's price and quantity before any computation
pub fn validate_item(name: &str, unit_price: f64, quantity: i32) -> AppResult<()> {
    if !unit_price.is_finite() {
        return Err(AppError::validation(format!(
            "Item '{}': price must be a finite number, got {}",
            name, unit_price
        )));
    }
    if unit_price < 0.0 {
        return Err(AppError::validation(format!(
            "Item '{}': price must be non-negative, got {}",
            name, unit_price
        )));
    }
    if unit_price > MAX_PRICE {
        return Err(AppError::validation(format!(
            "Item '{}': price exceeds maximum allowed ({})",
            name, MAX_PRICE
        )));
    }
    if quantity <= 0 {
        return Err(AppError::validation(format!(
            "Item '{}': quantity must be greater than 0, got {}",
            name, quantity
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "Item '{}': quantity exceeds maximum allowed ({})",
            name, MAX_QUANTITY
        )));
    }
    Ok(())
}

/// unit_price * quantity，2 位小数
pub fn line_subtotal(unit_price: f64, quantity: i32) -> f64 {
    to_f64(to_decimal(unit_price) * Decimal::from(quantity))
}

/// 行小计之和，2 位小数
pub fn order_total(lines: impl Iterator<Item = (f64, i32)>) -> f64 {
    let total = lines.fold(Decimal::ZERO, |acc, (unit_price, quantity)| {
        acc + to_decimal(unit_price) * Decimal::from(quantity)
    });
    to_f64(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_precision_beats_f64() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let a = 0.1_f64;
        let b = 0.2_f64;
        assert_ne!(a + b, 0.3);

        let sum_dec = to_decimal(a) + to_decimal(b);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn accumulation_precision() {
        // Sum 0.01 one thousand times
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += to_decimal(0.01);
        }
        assert_eq!(to_f64(total), 10.0);
    }

    #[test]
    fn line_subtotal_rounds_half_up() {
        assert_eq!(line_subtotal(10.99, 3), 32.97);
        assert_eq!(line_subtotal(0.005, 1), 0.01);
    }

    #[test]
    fn order_total_sums_lines() {
        let lines = [(10.99, 3), (3.50, 2), (0.10, 1)];
        // 32.97 + 7.00 + 0.10
        assert_eq!(order_total(lines.into_iter()), 40.07);
    }

    #[test]
    fn rejects_invalid_items() {
        assert!(validate_item("Pizza", -1.0, 1).is_err());
        assert!(validate_item("Pizza", f64::NAN, 1).is_err());
        assert!(validate_item("Pizza", f64::INFINITY, 1).is_err());
        assert!(validate_item("Pizza", 8.5, 0).is_err());
        assert!(validate_item("Pizza", 8.5, -2).is_err());
        assert!(validate_item("Pizza", 8.5, 1000).is_err());
        assert!(validate_item("Pizza", 2_000_000.0, 1).is_err());
        assert!(validate_item("Pizza", 8.5, 2).is_ok());
    }
}
