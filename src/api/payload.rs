//! Request body parsing.
//!
//! Bodies arrive as loose JSON. These helpers pull out the fields each
//! operation understands and never fail on their own: missing or malformed
//! fields come back as `None` or an empty list, and the operation decides
//! what that means.

use serde_json::Value;

use crate::core::monitor::{normalize_names, split_names, IntervalValue};

fn field<'a>(payload: &'a Value, key: &str) -> Option<&'a Value> {
    payload.get(key).filter(|v| !v.is_null())
}

/// A name list given either as a JSON array or as a free-text string.
pub fn name_list(raw: &Value) -> Vec<String> {
    match raw {
        Value::String(text) => split_names(text),
        other => normalize_names(other),
    }
}

/// The `processes` field, if present.
pub fn processes(payload: &Value) -> Option<Vec<String>> {
    field(payload, "processes").map(name_list)
}

/// `names`, falling back to `processes`.
pub fn names_or_processes(payload: &Value) -> Option<Vec<String>> {
    field(payload, "names")
        .or_else(|| field(payload, "processes"))
        .map(name_list)
}

/// `interval`, falling back to `update_interval`.
pub fn interval(payload: &Value) -> Option<IntervalValue> {
    field(payload, "interval")
        .or_else(|| field(payload, "update_interval"))
        .map(IntervalValue::from_json)
}

/// The single `name` field used by remove.
pub fn name(payload: &Value) -> Option<String> {
    let name = match field(payload, "name")? {
        Value::String(s) => s.trim().to_string(),
        Value::Object(_) | Value::Array(_) => return None,
        other => other.to_string(),
    };

    Some(name).filter(|s| !s.is_empty())
}
