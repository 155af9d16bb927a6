//! Money calculation utilities using rust_decimal for precision
//!
//! Monetary fields are stored as `f64` rounded to 6 decimal places;
//! all arithmetic is done through `Decimal` and converted back for
//! storage/serialization.

use rust_decimal::prelude::*;

/// Rounding for stored monetary values (6 decimal places, half-up)
const DECIMAL_PLACES: u32 = 6;

/// Tolerance for monetary comparisons (1e-6)
pub const MONEY_TOLERANCE: f64 = 1e-6;

fn dec(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Round a monetary value to the stored precision.
pub fn round(value: f64) -> f64 {
    dec(value)
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// `a + b`, rounded.
pub fn add(a: f64, b: f64) -> f64 {
    round((dec(a) + dec(b)).to_f64().unwrap_or(0.0))
}

/// `a - b`, rounded.
pub fn sub(a: f64, b: f64) -> f64 {
    round((dec(a) - dec(b)).to_f64().unwrap_or(0.0))
}

/// `unit * quantity`, rounded.
pub fn times(unit: f64, quantity: i32) -> f64 {
    round((dec(unit) * Decimal::from(quantity)).to_f64().unwrap_or(0.0))
}

/// Equality within the monetary tolerance.
pub fn eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= MONEY_TOLERANCE
}

/// `a >= b` within the monetary tolerance.
pub fn gte(a: f64, b: f64) -> bool {
    a > b || eq(a, b)
}

pub fn is_zero(value: f64) -> bool {
    eq(value, 0.0)
}
