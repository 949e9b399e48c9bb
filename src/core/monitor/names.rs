//! Watch-list name normalization.
//!
//! Every name that enters the watch list goes through here: surrounding
//! whitespace is trimmed, empty entries are dropped and duplicates are
//! removed case-insensitively, keeping the casing and position of the first
//! occurrence.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;\n]+").expect("separator pattern is valid"));

/// Case-insensitive comparison key for a name.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Whether two names refer to the same watched process.
pub fn same_name(a: &str, b: &str) -> bool {
    name_key(a) == name_key(b)
}

/// Normalize typed names into an ordered, deduplicated watch list.
pub fn normalize<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for name in names {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.push(trimmed.to_string());
        }
    }

    out
}

/// Normalize a JSON process list.
///
/// Accepts an array whose items are either bare strings or objects with a
/// `name` field, e.g. `["python", {"name": "chrome"}]`. Numbers and booleans
/// are stringified. Anything that is not an array yields an empty list.
pub fn normalize_names(raw: &Value) -> Vec<String> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    normalize(items.iter().filter_map(entry_name))
}

/// Split a human-typed line on commas, semicolons or newlines, then normalize.
pub fn split_names(raw: &str) -> Vec<String> {
    normalize(SEPARATORS.split(raw))
}

/// Union of `existing` and `incoming`: existing order first, then every
/// incoming name not already present.
pub fn merge_names(existing: &[String], incoming: &[String]) -> Vec<String> {
    normalize(existing.iter().chain(incoming.iter()))
}

fn entry_name(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("name").and_then(scalar_to_string),
        other => scalar_to_string(other),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
