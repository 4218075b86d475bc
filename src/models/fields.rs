//! Readers for loosely-typed document fields.
//!
//! Stored records come from many hands (admin forms, seed scripts, manual
//! edits), so every reader tolerates a missing key or a value of the wrong type.

use serde_json::{Map, Value};

/// Non-empty string value of `key`.
pub(crate) fn text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// String or number value of `key`, rendered as text.
pub(crate) fn scalar_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric value of `key`; strings are not coerced.
pub(crate) fn number(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

/// Numeric value of `key`, also read from a numeric string.
pub(crate) fn lenient_number(map: &Map<String, Value>, key: &str) -> Option<f64> {
    match map.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Trimmed, non-empty string or number value of `key`.
pub(crate) fn loose_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    scalar_text(map, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub(crate) fn flag(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

/// String items of an array value, trimmed, empty ones dropped.
pub(crate) fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Copy of `map` without the keys the normalised view already renders.
pub(crate) fn passthrough(map: &Map<String, Value>, rendered: &[&str]) -> Map<String, Value> {
    map.iter()
        .filter(|(k, _)| !rendered.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
