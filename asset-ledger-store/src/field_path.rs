//! Dotted-path access into nested JSON objects (`stats.health`,
//! `combat.attackRange`, `spawning.biomes`).

use asset_ledger_core::LedgerError;
use serde_json::{Map, Value};

fn segments(path: &str) -> Result<Vec<&str>, LedgerError> {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(LedgerError::validation(format!(
            "invalid field path '{}'",
            path
        )));
    }
    Ok(parts)
}

/// Assign `value` at `path` inside `map`.
///
/// Missing intermediate segments are created as empty objects. A `null`
/// value removes the leaf key instead (removing a missing key is a no-op and
/// creates nothing). Walking through a non-object value is rejected.
pub fn set_field(map: &mut Map<String, Value>, path: &str, value: Value) -> Result<(), LedgerError> {
    let parts = segments(path)?;
    set_in(map, &parts, value, path)
}

fn set_in(
    map: &mut Map<String, Value>,
    parts: &[&str],
    value: Value,
    full_path: &str,
) -> Result<(), LedgerError> {
    let Some((head, rest)) = parts.split_first() else {
        return Err(LedgerError::validation("empty field path"));
    };

    if rest.is_empty() {
        if value.is_null() {
            map.shift_remove(*head);
        } else {
            map.insert((*head).to_string(), value);
        }
        return Ok(());
    }

    if value.is_null() && !map.contains_key(*head) {
        return Ok(());
    }

    let child = map
        .entry((*head).to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    match child {
        Value::Object(inner) => set_in(inner, rest, value, full_path),
        other => Err(LedgerError::validation(format!(
            "cannot set '{}': '{}' holds {} rather than an object",
            full_path,
            head,
            kind(other)
        ))),
    }
}

/// Read the value at `path`, if every segment exists.
pub fn get_field<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = map.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "tests/field_path_tests.rs"]
mod tests;
