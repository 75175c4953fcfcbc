//! Finite-number coercion, rounding, and snapping.
//!
//! Parameters arrive as arbitrary JSON and pointer math can produce NaN, so
//! every numeric read goes through `finite_or` / `param_f64` with a typed
//! fallback instead of propagating a bad value.

use serde_json::{Map, Value};

/// Decimal digits are capped here for both display and rounding.
pub const MAX_PRECISION: u32 = 6;

pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Coerce a JSON value to a finite number. Numeric strings are accepted.
pub fn value_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Read a numeric parameter, falling back when missing or non-finite.
pub fn param_f64(params: &Map<String, Value>, key: &str, fallback: f64) -> f64 {
    params.get(key).and_then(value_f64).unwrap_or(fallback)
}

pub fn param_str<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

/// Number of decimal digits in `step`, capped at `MAX_PRECISION`.
///
/// `0.25` → 2, `1` → 0, `1e-9` → 6.
pub fn decimal_places(step: f64) -> u32 {
    if !step.is_finite() || step <= 0.0 {
        return 0;
    }
    for digits in 0..MAX_PRECISION {
        let scaled = step * 10f64.powi(digits as i32);
        if (scaled - scaled.round()).abs() < 1e-9 * scaled.abs().max(1.0) {
            return digits;
        }
    }
    MAX_PRECISION
}

pub fn round_to_precision(value: f64, digits: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(digits.min(MAX_PRECISION) as i32);
    let rounded = (value * factor).round() / factor;
    // Normalize -0.0 so formatted output never shows "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Quantize a drag delta to multiples of `step`.
pub fn snap_delta(delta: f64, step: f64) -> f64 {
    if !delta.is_finite() {
        return 0.0;
    }
    if !step.is_finite() || step <= 0.0 {
        return delta;
    }
    let snapped = (delta / step).round() * step;
    if snapped == 0.0 { 0.0 } else { snapped }
}

/// Format with exactly `digits` decimals.
pub fn format_fixed(value: f64, digits: u32) -> String {
    format!("{:.*}", digits.min(MAX_PRECISION) as usize, value)
}
