//! Sanitation of untrusted scalar fields from remote responses
//!
//! Every value coming back from the history endpoint goes through one of
//! these functions before it is stored. None of them fail: malformed input
//! collapses into a fallback.

use serde_json::Value;

/// Coerce a JSON value into a number the way JavaScript's `Number()` does,
/// returning `fallback` when the result is NaN or infinite.
///
/// Strings are trimmed before parsing and an empty string is `0`; unsigned
/// `0x`, `0o` and `0b` literals are read in their radix.
/// Booleans map to `1`/`0`, `null` to `0`. Arrays and objects are treated as
/// not-a-number.
pub fn ensure_valid_number(value: &Value, fallback: f64) -> f64 {
    let num = match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                parse_radix_literal(trimmed)
                    .unwrap_or_else(|| trimmed.parse::<f64>().unwrap_or(f64::NAN))
            }
        }
        Value::Bool(true) => 1.0,
        Value::Bool(false) | Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    };

    if num.is_finite() {
        num
    } else {
        fallback
    }
}

/// `0x1F`, `0o17` or `0b101`. `None` when `s` has no radix prefix; NaN when
/// the digits are invalid for it.
fn parse_radix_literal(s: &str) -> Option<f64> {
    let radix = match s.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &s[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let value = digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix)
            .map(|d| acc * f64::from(radix) + f64::from(d))
    });
    Some(value.unwrap_or(f64::NAN))
}

/// Coerce a JSON value into a count: non-finite becomes `0`, negatives are
/// clamped to `0` and fractions are truncated.
pub fn ensure_valid_count(value: &Value) -> u64 {
    let num = ensure_valid_number(value, 0.0);
    if num <= 0.0 {
        0
    } else {
        // `as` saturates at u64::MAX
        num.trunc() as u64
    }
}

/// Truthiness of a remote flag. Absent and `null` are false.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    }
}

/// The record list of a page; anything that is not an array reads as empty.
pub fn records(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items.as_slice(),
        _ => &[],
    }
}

/// Offset to request for the next page. A cursor that is not aligned to the
/// page size cannot have come from a completed fetch and restarts at `0`.
pub fn ensure_valid_offset(cursor: u64, limit: u64) -> u64 {
    if limit == 0 || cursor % limit != 0 {
        log::warn!("Discarding misaligned cursor {cursor} (page size {limit})");
        0
    } else {
        cursor
    }
}

/// Records still available remotely, never negative.
pub fn remaining(total: u64, loaded: usize) -> u64 {
    total.saturating_sub(loaded as u64)
}
