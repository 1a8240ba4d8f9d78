//! Rendering and truthiness helpers for parameter values.
//!
//! Values flowing through the engine are plain `serde_json::Value`s, with
//! `Null` standing for an absent or undefined value.

use serde_json::Value;

/// Renders a value the way validation messages quote it.
///
/// Strings are quoted, collections use compact JSON.
///
/// ```rust
/// use anvil_validator::value::inspect;
/// use serde_json::json;
///
/// assert_eq!(inspect(&json!("foo")), "\"foo\"");
/// assert_eq!(inspect(&json!(["foo"])), "[\"foo\"]");
/// ```
#[must_use]
pub fn inspect(value: &Value) -> String {
    value.to_string()
}

/// Renders a value for interpolation into text.
///
/// Strings render without quotes and `Null` renders empty; everything else
/// falls back to [`inspect`].
#[must_use]
pub fn to_display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => inspect(other),
    }
}

/// Whether a value counts as `true` in a boolean position.
///
/// `Null`, `false` and the string `"false"` are false, everything else is true.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => s != "false",
        _ => true,
    }
}

/// Reads an integer the way legacy validation functions do: from the
/// value's display string, surrounding whitespace ignored.
#[must_use]
pub fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
