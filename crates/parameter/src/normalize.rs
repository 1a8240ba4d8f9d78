//! Normalization of values handed in by front ends.
//!
//! Interactive front ends hand back decorated strings (colour, emphasis).
//! Anything implementing [`StringLike`] is reduced to its plain text when it
//! becomes a [`RawValue`], and everything assigned to a parameter goes
//! through [`RawValue::normalize`], so casts and comparisons only ever see
//! plain JSON strings.

use std::fmt;

use anvil_validator::value::to_display;
use serde_json::{Map, Value};

/// Something that carries plain text under its decoration.
pub trait StringLike {
    fn to_plain_string(&self) -> String;
}

impl StringLike for str {
    fn to_plain_string(&self) -> String {
        self.to_owned()
    }
}

impl StringLike for String {
    fn to_plain_string(&self) -> String {
        self.clone()
    }
}

/// A string carrying terminal styles, as produced by the interactive
/// front end.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledString {
    text: String,
    styles: Vec<String>,
}

impl StyledString {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            styles: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.styles.push(style.into());
        self
    }

    #[must_use]
    pub fn styles(&self) -> &[String] {
        &self.styles
    }
}

impl StringLike for StyledString {
    fn to_plain_string(&self) -> String {
        self.text.clone()
    }
}

impl fmt::Display for StyledString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A value as received at the assignment boundary, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Plain(Value),
    Array(Vec<RawValue>),
    /// Key/value pairs; keys may themselves be decorated.
    Hash(Vec<(RawValue, RawValue)>),
}

impl RawValue {
    /// Plain text of any decorated string.
    pub fn from_string_like<S: StringLike + ?Sized>(value: &S) -> Self {
        Self::Plain(Value::String(value.to_plain_string()))
    }

    /// Build a hash from any pairs convertible into raw values.
    pub fn hash<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Self>,
        V: Into<Self>,
    {
        Self::Hash(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Flatten into a plain JSON value.
    ///
    /// Hash keys that normalize to something other than a string use their
    /// display form.
    #[must_use]
    pub fn normalize(self) -> Value {
        match self {
            Self::Plain(value) => value,
            Self::Array(items) => Value::Array(items.into_iter().map(Self::normalize).collect()),
            Self::Hash(pairs) => {
                let map: Map<String, Value> = pairs
                    .into_iter()
                    .map(|(key, value)| {
                        let key = match key.normalize() {
                            Value::String(s) => s,
                            other => to_display(&other),
                        };
                        (key, value.normalize())
                    })
                    .collect();
                Value::Object(map)
            }
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        Self::Plain(value)
    }
}

impl From<StyledString> for RawValue {
    fn from(value: StyledString) -> Self {
        Self::from_string_like(&value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Plain(Value::String(value.to_owned()))
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Plain(Value::String(value))
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Plain(Value::Bool(value))
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Plain(Value::from(value))
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Plain(Value::Null), Into::into)
    }
}
