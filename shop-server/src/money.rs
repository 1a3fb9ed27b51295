//! Money arithmetic with `rust_decimal`
//!
//! Amounts are stored as `f64` (SQLite REAL). Sums and products are computed
//! as `Decimal` and rounded to 2 places on the way back out.

use rust_decimal::prelude::*;
use shared::error::{AppError, ErrorCode};

const DECIMAL_PLACES: u32 = 2;

/// Maximum quantity of one order line
pub const MAX_QUANTITY: i64 = 9999;
/// Maximum catalog price
pub const MAX_PRICE: f64 = 1_000_000.0;

#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// `price × quantity` for one line
pub fn line_total(price: f64, quantity: i64) -> Decimal {
    to_decimal(price) * Decimal::from(quantity)
}

pub fn validate_quantity(quantity: i64) -> Result<(), AppError> {
    if quantity <= 0 || quantity > MAX_QUANTITY {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            format!("quantity must be between 1 and {MAX_QUANTITY}, got {quantity}"),
        )
        .with_detail("quantity", quantity));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 || price > MAX_PRICE {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            format!("price must be between 0 and {MAX_PRICE}"),
        ));
    }
    Ok(())
}
