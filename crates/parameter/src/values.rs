use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parameter::Parameter;

/// Resolved parameter values keyed by parameter name.
///
/// This is the context rules and conditions read sibling values from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterValues {
    #[serde(flatten)]
    values: HashMap<String, Value>,
}

impl ParameterValues {
    /// Create an empty value set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by parameter name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Set a value for a parameter name.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Add a value (builder-style, consuming).
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for ParameterValues {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Snapshot of each parameter's resolved value.
impl<'a> FromIterator<&'a Parameter> for ParameterValues {
    fn from_iter<I: IntoIterator<Item = &'a Parameter>>(iter: I) -> Self {
        iter.into_iter()
            .map(|param| (param.name().to_owned(), param.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_and_get() {
        let mut vals = ParameterValues::new();
        assert!(vals.is_empty());
        vals.set("db_type", json!("mysql"));
        vals.set("pool_size", json!(5));
        vals.set("db_type", json!("sqlite"));

        assert_eq!(vals.get("db_type"), Some(&json!("sqlite")));
        assert_eq!(vals.get("pool_size"), Some(&json!(5)));
        assert_eq!(vals.get("missing"), None);
        assert_eq!(vals.len(), 2);
    }

    #[test]
    fn snapshot_from_parameters() {
        let mut set = Parameter::new("set");
        set.set_value("foo");
        let unset = Parameter::new("unset");

        let vals: ParameterValues = [&set, &unset].into_iter().collect();
        assert_eq!(vals.get("set"), Some(&json!("foo")));
        assert_eq!(vals.get("unset"), Some(&Value::Null));
    }

    #[test]
    fn serde_is_flat() {
        let vals = ParameterValues::new().with_value("a", json!(1));
        assert_eq!(serde_json::to_value(&vals).unwrap(), json!({"a": 1}));
        let back: ParameterValues = serde_json::from_value(json!({"a": 1})).unwrap();
        assert_eq!(back, vals);
    }
}
