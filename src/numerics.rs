//! Numeric comparison across mixed representations.
//!
//! Values of different numeric widths compare by promoting to a common
//! representation: anything involving a float compares as `f64`, anything
//! involving a fixed-point value as `rust_decimal::Decimal`, and pure
//! integers as `i128` so that `i64`/`u64` cross-comparisons cannot
//! overflow. Tolerances are applied after promotion.

use std::cmp::Ordering;
use std::time::Duration;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::compare::CompareError;
use crate::tolerance::{Tolerance, ToleranceMode};
use crate::value::Value;

/// Test numeric equality under a tolerance. Both values must satisfy
/// `Value::is_numeric`.
pub fn are_equal(expected: &Value, actual: &Value, tol: &Tolerance) -> Result<bool, CompareError> {
    if is_float(expected) || is_float(actual) {
        return floats_equal(as_f64(expected), as_f64(actual), tol);
    }

    if tol.mode() == ToleranceMode::Ulps {
        return Err(CompareError::UlpsRequiresFloat);
    }

    if is_decimal(expected) || is_decimal(actual) {
        return decimals_equal(as_decimal(expected), as_decimal(actual), tol);
    }

    integers_equal(as_i128(expected), as_i128(actual), tol)
}

/// Natural ordering across numeric representations. `None` when either
/// side is NaN.
pub fn try_compare(a: &Value, b: &Value) -> Option<Ordering> {
    if is_float(a) || is_float(b) {
        return as_f64(a).partial_cmp(&as_f64(b));
    }
    if is_decimal(a) || is_decimal(b) {
        return Some(as_decimal(a).cmp(&as_decimal(b)));
    }
    Some(as_i128(a).cmp(&as_i128(b)))
}

/// Test duration equality under a tolerance. The window comes from a
/// time-unit mode with a numeric amount, or a linear mode with a duration
/// amount.
pub fn durations_equal(
    expected: Duration,
    actual: Duration,
    tol: &Tolerance,
) -> Result<bool, CompareError> {
    if tol.is_unset() {
        return Ok(expected == actual);
    }
    let window = tol
        .duration_window()
        .ok_or_else(|| CompareError::BadToleranceAmount {
            tolerance: tol.to_string(),
            target: "duration".to_string(),
        })?;
    let diff = if expected >= actual {
        expected - actual
    } else {
        actual - expected
    };
    Ok(diff <= window)
}

fn is_float(v: &Value) -> bool {
    matches!(v, Value::Float(_))
}

fn is_decimal(v: &Value) -> bool {
    matches!(v, Value::Decimal(_))
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Int(n) => *n as f64,
        Value::UInt(n) => *n as f64,
        Value::Float(x) => *x,
        Value::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn as_decimal(v: &Value) -> Decimal {
    match v {
        Value::Int(n) => Decimal::from(*n),
        Value::UInt(n) => Decimal::from(*n),
        Value::Decimal(d) => *d,
        _ => Decimal::ZERO,
    }
}

fn as_i128(v: &Value) -> i128 {
    match v {
        Value::Int(n) => *n as i128,
        Value::UInt(n) => *n as i128,
        _ => 0,
    }
}

fn floats_equal(expected: f64, actual: f64, tol: &Tolerance) -> Result<bool, CompareError> {
    // NaN equals NaN by convention, and is never widened by a tolerance.
    if expected.is_nan() && actual.is_nan() {
        return Ok(true);
    }
    if expected.is_nan() || actual.is_nan() || expected.is_infinite() || actual.is_infinite() {
        return Ok(expected == actual);
    }

    match tol.mode() {
        ToleranceMode::Unset => Ok(expected == actual),
        ToleranceMode::Linear => {
            let amount = numeric_amount(tol, "float")?;
            if amount > 0.0 {
                Ok((expected - actual).abs() <= amount)
            } else {
                Ok(expected == actual)
            }
        }
        ToleranceMode::Percent => {
            if expected == actual {
                return Ok(true);
            }
            let amount = numeric_amount(tol, "float")?;
            let relative = ((expected - actual) / expected).abs();
            Ok(relative <= amount / 100.0)
        }
        ToleranceMode::Ulps => {
            let amount = numeric_amount(tol, "float")?;
            Ok(ulps_distance(expected, actual) <= amount as u64)
        }
        mode => Err(CompareError::BadToleranceMode(mode)),
    }
}

/// Distance between two floats in representable-value steps. Maps the bit
/// patterns onto a lexicographically ordered integer line so the distance
/// is valid across the zero crossing.
fn ulps_distance(a: f64, b: f64) -> u64 {
    fn ordered_bits(x: f64) -> i64 {
        let bits = x.to_bits() as i64;
        if bits < 0 {
            i64::MIN.wrapping_sub(bits)
        } else {
            bits
        }
    }
    ordered_bits(a).wrapping_sub(ordered_bits(b)).unsigned_abs()
}

fn decimals_equal(expected: Decimal, actual: Decimal, tol: &Tolerance) -> Result<bool, CompareError> {
    match tol.mode() {
        ToleranceMode::Unset => Ok(expected == actual),
        ToleranceMode::Linear => {
            let amount = decimal_amount(tol)?;
            if amount > Decimal::ZERO {
                Ok((expected - actual).abs() <= amount)
            } else {
                Ok(expected == actual)
            }
        }
        ToleranceMode::Percent => {
            if expected == actual {
                return Ok(true);
            }
            let amount = decimal_amount(tol)?;
            match (expected - actual).checked_div(expected) {
                Some(relative) => Ok(relative.abs() <= amount / Decimal::ONE_HUNDRED),
                None => Ok(false),
            }
        }
        mode => Err(CompareError::BadToleranceMode(mode)),
    }
}

fn integers_equal(expected: i128, actual: i128, tol: &Tolerance) -> Result<bool, CompareError> {
    let diff = expected.abs_diff(actual);
    match tol.mode() {
        ToleranceMode::Unset => Ok(expected == actual),
        ToleranceMode::Linear => match tol.amount() {
            Value::Int(n) if *n >= 0 => Ok(diff <= *n as u128),
            Value::UInt(n) => Ok(diff <= *n as u128),
            Value::Float(x) if *x >= 0.0 => Ok(diff as f64 <= *x),
            _ => Err(CompareError::BadToleranceAmount {
                tolerance: tol.to_string(),
                target: "integer".to_string(),
            }),
        },
        ToleranceMode::Percent => {
            if expected == actual {
                return Ok(true);
            }
            let amount = numeric_amount(tol, "integer")?;
            let relative = diff as f64 / (expected as f64).abs();
            Ok(relative <= amount / 100.0)
        }
        mode => Err(CompareError::BadToleranceMode(mode)),
    }
}

fn numeric_amount(tol: &Tolerance, target: &str) -> Result<f64, CompareError> {
    match tol.amount() {
        Value::Int(n) => Ok(*n as f64),
        Value::UInt(n) => Ok(*n as f64),
        Value::Float(x) => Ok(*x),
        Value::Decimal(d) => Ok(d.to_f64().unwrap_or(f64::NAN)),
        _ => Err(CompareError::BadToleranceAmount {
            tolerance: tol.to_string(),
            target: target.to_string(),
        }),
    }
}

fn decimal_amount(tol: &Tolerance) -> Result<Decimal, CompareError> {
    let amount = match tol.amount() {
        Value::Int(n) => Some(Decimal::from(*n)),
        Value::UInt(n) => Some(Decimal::from(*n)),
        Value::Float(x) => Decimal::from_f64(*x),
        Value::Decimal(d) => Some(*d),
        _ => None,
    };
    amount.ok_or_else(|| CompareError::BadToleranceAmount {
        tolerance: tol.to_string(),
        target: "decimal".to_string(),
    })
}
