//! Data Type Registry
//!
//! Turns a declared type name such as `Optional[Array[Integer]]` into a
//! [`DataType`] tree that can cast raw values and judge their validity.
//!
//! Casting never fails: a value that cannot be interpreted is handed back
//! unchanged and rejected later by [`DataType::is_valid`], which appends
//! stable, human-readable messages.
//!
//! ```rust
//! use anvil_validator::data_type::DataType;
//! use serde_json::json;
//!
//! let ty = DataType::from_type_name("Array[Integer]").unwrap();
//! let cast = ty.typecast(&json!(["1", "2"]));
//! assert_eq!(cast, json!([1, 2]));
//!
//! let mut errors = Vec::new();
//! assert!(!ty.is_valid(&json!(["foo"]), &mut errors));
//! assert_eq!(errors, vec![r#"Elements of the array are invalid: "foo" is not a valid integer"#]);
//! ```

mod parser;

use std::fmt;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ValidatorError;
use crate::value::inspect;

/// A structural type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// No structural rules: every value casts and validates unchanged.
    Unspecified,
    String,
    Integer { min: Option<i64>, max: Option<i64> },
    Boolean,
    /// Array whose elements must validate as the inner type.
    Array(Box<DataType>),
    /// Hash whose keys and values must validate as the given types.
    Hash(Box<DataType>, Box<DataType>),
    /// Either undef or a value of the inner type.
    Optional(Box<DataType>),
    /// Valid when any member accepts the value, tried in declaration order.
    Variant(Vec<DataType>),
    /// One of a fixed set of strings.
    Enum(Vec<String>),
    /// A string matching at least one of the regular expressions.
    Pattern(Vec<String>),
    Undef,
}

impl DataType {
    /// Build a descriptor from a declared type name.
    ///
    /// Names the registry does not know (for example `Stdlib::Absolutepath`)
    /// become [`DataType::Unspecified`]; only malformed syntax is an error.
    pub fn from_type_name(type_name: &str) -> Result<Self, ValidatorError> {
        parser::parse(type_name)
    }

    /// Cast a raw value into this type's representation where a cast rule
    /// applies, otherwise return it unchanged.
    #[must_use]
    pub fn typecast(&self, value: &Value) -> Value {
        match self {
            Self::Integer { .. } => match value {
                Value::String(s) if is_integer_literal(s) => {
                    s.parse::<i64>().map_or_else(|_| value.clone(), Value::from)
                }
                _ => value.clone(),
            },
            Self::Boolean => match value {
                Value::String(s) if s == "true" || s == "yes" => Value::Bool(true),
                Value::String(s) if s == "false" || s == "no" => Value::Bool(false),
                _ => value.clone(),
            },
            Self::Array(inner) => match value {
                Value::Array(items) => {
                    Value::Array(items.iter().map(|item| inner.typecast(item)).collect())
                }
                _ => value.clone(),
            },
            Self::Hash(_, inner) => match hash_from_pairs(value) {
                Some(map) => Value::Object(
                    map.into_iter()
                        .map(|(k, v)| (k, inner.typecast(&v)))
                        .collect(),
                ),
                None => value.clone(),
            },
            Self::Optional(inner) => {
                if value.is_null() {
                    Value::Null
                } else {
                    inner.typecast(value)
                }
            }
            Self::Variant(members) => members
                .iter()
                .map(|member| member.typecast(value))
                .zip(members)
                .find(|(cast, member)| member.is_valid(cast, &mut Vec::new()))
                .map_or_else(|| value.clone(), |(cast, _)| cast),
            Self::Unspecified
            | Self::String
            | Self::Enum(_)
            | Self::Pattern(_)
            | Self::Undef => value.clone(),
        }
    }

    /// Judge a (normally already cast) value, appending a message to
    /// `errors` for every problem found.
    pub fn is_valid(&self, value: &Value, errors: &mut Vec<String>) -> bool {
        match self {
            Self::Unspecified => true,
            Self::String => kind_check(value.is_string(), value, "string", errors),
            Self::Boolean => kind_check(value.is_boolean(), value, "boolean", errors),
            Self::Integer { min, max } => {
                let Some(number) = value.as_i64() else {
                    errors.push(format!("{} is not a valid integer", inspect(value)));
                    return false;
                };
                if let Some(min) = min
                    && number < *min
                {
                    errors.push(format!("{number} must be at least {min}"));
                    return false;
                }
                if let Some(max) = max
                    && number > *max
                {
                    errors.push(format!("{number} must be less than {max}"));
                    return false;
                }
                true
            }
            Self::Array(inner) => {
                let Some(items) = value.as_array() else {
                    errors.push(format!("{} is not a valid array", inspect(value)));
                    return false;
                };
                for item in items {
                    let mut element_errors = Vec::new();
                    if !inner.is_valid(item, &mut element_errors) {
                        errors.push(format!(
                            "Elements of the array are invalid: {}",
                            element_errors.join(", ")
                        ));
                        return false;
                    }
                }
                true
            }
            Self::Hash(key, inner) => {
                let Some(map) = value.as_object() else {
                    errors.push(format!("{} is not a valid hash", inspect(value)));
                    return false;
                };
                for (k, v) in map {
                    let mut element_errors = Vec::new();
                    let key_ok = key.is_valid(&Value::String(k.clone()), &mut element_errors);
                    if !key_ok || !inner.is_valid(v, &mut element_errors) {
                        errors.push(format!(
                            "Elements of the hash are invalid: {}",
                            element_errors.join(", ")
                        ));
                        return false;
                    }
                }
                true
            }
            Self::Optional(inner) => value.is_null() || inner.is_valid(value, errors),
            Self::Variant(members) => {
                let mut last_errors = Vec::new();
                for member in members {
                    last_errors.clear();
                    if member.is_valid(&member.typecast(value), &mut last_errors) {
                        return true;
                    }
                }
                errors.extend(last_errors);
                false
            }
            Self::Enum(allowed) => {
                if value.as_str().is_some_and(|s| allowed.iter().any(|a| a == s)) {
                    return true;
                }
                errors.push(format!(
                    "{} must be one of {}",
                    inspect(value),
                    quoted_list(allowed)
                ));
                false
            }
            Self::Pattern(patterns) => {
                // Parsed type names only carry patterns that compile.
                let matched = value.as_str().is_some_and(|s| {
                    patterns
                        .iter()
                        .filter_map(|p| Regex::new(p).ok())
                        .any(|re| re.is_match(s))
                });
                if !matched {
                    errors.push(format!(
                        "{} does not match {}",
                        inspect(value),
                        slashed_list(patterns)
                    ));
                }
                matched
            }
            Self::Undef => {
                if value.is_null() {
                    return true;
                }
                errors.push(format!("{} must be undef", inspect(value)));
                false
            }
        }
    }

    /// Cast then validate in one step, returning the cast value together
    /// with any messages.
    #[must_use]
    pub fn check(&self, value: &Value) -> (Value, Vec<String>) {
        let cast = self.typecast(value);
        let mut errors = Vec::new();
        self.is_valid(&cast, &mut errors);
        (cast, errors)
    }
}

impl fmt::Display for DataType {
    /// Human-readable description used in deprecation warnings.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => f.write_str("any value"),
            Self::String => f.write_str("string"),
            Self::Boolean => f.write_str("boolean"),
            Self::Undef => f.write_str("undef"),
            Self::Integer { min, max } => match (min, max) {
                (None, None) => f.write_str("integer"),
                (Some(min), Some(max)) => write!(f, "integer (between {min} and {max})"),
                (Some(min), None) => write!(f, "integer (at least {min})"),
                (None, Some(max)) => write!(f, "integer (at most {max})"),
            },
            Self::Array(inner) => match inner.as_ref() {
                Self::Unspecified => f.write_str("array"),
                inner => write!(f, "array of {inner}"),
            },
            Self::Hash(key, value) => match (key.as_ref(), value.as_ref()) {
                (Self::Unspecified, Self::Unspecified) => f.write_str("hash"),
                (key, value) => write!(f, "hash of {key} => {value}"),
            },
            Self::Optional(inner) => write!(f, "{inner} or undef"),
            Self::Variant(members) => {
                let names: Vec<String> = members.iter().map(ToString::to_string).collect();
                write!(f, "any of {}", names.join(", "))
            }
            Self::Enum(allowed) => write!(f, "one of {}", quoted_list(allowed)),
            Self::Pattern(patterns) => write!(f, "value matching {}", slashed_list(patterns)),
        }
    }
}

fn kind_check(ok: bool, value: &Value, kind: &str, errors: &mut Vec<String>) -> bool {
    if !ok {
        errors.push(format!("{} is not a valid {kind}", inspect(value)));
    }
    ok
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Accepts an object as is, or builds one from `key:value` strings.
fn hash_from_pairs(value: &Value) -> Option<Map<String, Value>> {
    fn split(entry: &Value) -> Option<(String, Value)> {
        let (key, value) = entry.as_str()?.split_once(':')?;
        Some((key.to_owned(), Value::String(value.to_owned())))
    }

    match value {
        Value::Object(map) => Some(map.clone()),
        Value::String(_) => split(value).map(|(k, v)| Map::from_iter([(k, v)])),
        Value::Array(items) if !items.is_empty() => items.iter().map(split).collect(),
        _ => None,
    }
}

fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("'{item}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn slashed_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("/{item}/"))
        .collect::<Vec<_>>()
        .join(", ")
}
