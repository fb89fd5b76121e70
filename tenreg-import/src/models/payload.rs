//! Payload field access
//!
//! Container cells arrive as text and are JSON-decoded opportunistically,
//! so a given field may surface as a string, a number, or an array
//! depending on the producing device. These helpers normalize access.

use serde_json::{Map, Value};

/// Untyped candidate field values, keyed by the source's own spellings
pub type Payload = Map<String, Value>;

/// First non-empty value among the given keys
pub fn first_value<'a>(payload: &'a Payload, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| payload.get(*k))
        .find(|v| !is_empty(v))
}

/// True when a field is present and non-empty under any of the keys
pub fn is_present(payload: &Payload, keys: &[&str]) -> bool {
    first_value(payload, keys).is_some()
}

/// String form of the first non-empty value among the keys
pub fn get_string(payload: &Payload, keys: &[&str]) -> Option<String> {
    first_value(payload, keys).map(value_to_string)
}

/// Numeric form (f64) of the first non-empty value among the keys
pub fn get_f64(payload: &Payload, keys: &[&str]) -> Option<f64> {
    match first_value(payload, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integer form of the first non-empty value among the keys
pub fn get_i64(payload: &Payload, keys: &[&str]) -> Option<i64> {
    match first_value(payload, keys)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// List-of-strings form: a JSON array, or a single scalar as one element
pub fn get_string_list(payload: &Payload, keys: &[&str]) -> Vec<String> {
    match first_value(payload, keys) {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|v| !is_empty(v))
            .map(value_to_string)
            .collect(),
        Some(v) => vec![value_to_string(v)],
        None => Vec::new(),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}
