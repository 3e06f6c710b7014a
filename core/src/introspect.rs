//! Runtime-shape helpers for decoded JSON values.
//!
//! The host encodes envelope fields loosely (a flag may be `true`, `1` or
//! `"yes"`), so marker checks follow JavaScript truthiness rather than
//! strict boolean typing.

use serde_json::Value;

/// Shape of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

pub fn kind_of(value: &Value) -> ValueKind {
    match value {
        Value::Null => ValueKind::Null,
        Value::Bool(_) => ValueKind::Boolean,
        Value::Number(_) => ValueKind::Number,
        Value::String(_) => ValueKind::String,
        Value::Array(_) => ValueKind::Array,
        Value::Object(_) => ValueKind::Object,
    }
}

/// JavaScript truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// JavaScript string conversion (`'' + value`) for non-object values.
///
/// Objects serialize as JSON text instead of `[object Object]`; callers
/// only reach this for objects through `payload_text`.
pub fn to_js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Text body for a carried payload: JSON for objects, plain string form
/// for everything else.
pub fn payload_text(value: &Value) -> String {
    match kind_of(value) {
        ValueKind::Object => value.to_string(),
        _ => to_js_string(value),
    }
}
