//! Safe coercion of provider-supplied tool JSON at the trust boundary:
//! downstream code never touches raw `serde_json::Value`s directly.

use serde_json::Value;

/// `clamp(Number(x) || 0.5, 0, 1)` — missing or non-numeric confidence
/// defaults to 0.5, then the result is clamped into `[0, 1]`.
pub fn coerce_confidence(value: Option<&Value>) -> f64 {
    value
        .and_then(Value::as_f64)
        .unwrap_or(0.5)
        .clamp(0.0, 1.0)
}

/// Extracts a string array field, dropping any non-string elements.
pub fn coerce_string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

pub fn coerce_string(value: Option<&Value>, default: &str) -> String {
    value.and_then(Value::as_str).map(str::to_string).unwrap_or_else(|| default.to_string())
}

pub fn coerce_bool(value: Option<&Value>) -> bool {
    value.and_then(Value::as_bool).unwrap_or(false)
}
