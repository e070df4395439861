//! Coercion of resolved values to primitive types.
//!
//! A value of the requested type is used directly. Anything else is
//! formatted as text and parsed, so values read from the environment
//! (always strings) still satisfy the typed accessors.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::tree::kind_of;

pub(crate) fn to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 2^63, the first float past the `i64` range.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Integers are used directly, as are floats with no fractional part, so
/// `8000.0` reads as `8000`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub(crate) fn to_int(name: &str, value: &Value) -> Result<i64> {
    if let Some(i) = value.as_i64() {
        return Ok(i);
    }
    if let Some(f) = value.as_f64() {
        if f.fract() == 0.0 && (-I64_LIMIT..I64_LIMIT).contains(&f) {
            return Ok(f as i64);
        }
    }
    to_string(value)
        .trim()
        .parse()
        .map_err(|_| mismatch(name, "integer", value))
}

pub(crate) fn to_float(name: &str, value: &Value) -> Result<f64> {
    if let Some(f) = value.as_f64() {
        return Ok(f);
    }
    to_string(value)
        .trim()
        .parse()
        .map_err(|_| mismatch(name, "number", value))
}

/// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
pub(crate) fn to_bool(name: &str, value: &Value) -> Result<bool> {
    if let Some(b) = value.as_bool() {
        return Ok(b);
    }
    match to_string(value).trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(mismatch(name, "bool", value)),
    }
}

fn mismatch(name: &str, expected: &'static str, value: &Value) -> Error {
    Error::TypeMismatch {
        name: name.to_string(),
        expected,
        found: kind_of(value),
    }
}
