use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel a manifest uses to declare that a parameter is deliberately
/// unset. Matched case-sensitively.
pub const UNSET: &str = "UNSET";

/// Marker that turns a manifest default into a persisted-state lookup.
pub const REFERENCE_PREFIX: char = '$';

/// Default expression as declared in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ManifestDefault {
    /// A concrete value, used as is.
    Literal(Value),
    /// No default at all.
    #[default]
    Undef,
    /// The `"UNSET"` sentinel.
    Unset,
    /// Lookup key into the persisted dump, prefix already stripped
    /// (`$mod::params::test` is stored as `mod::params::test`).
    Reference(String),
}

impl ManifestDefault {
    /// Whether the default depends on persisted state and must therefore be
    /// written back after a run.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    /// Resolve against a persisted dump. Dumped values are returned as
    /// stored, without casting.
    #[must_use]
    pub fn resolve(&self, dump: &BTreeMap<String, Value>) -> Option<Value> {
        match self {
            Self::Literal(value) => Some(value.clone()),
            Self::Reference(key) => dump.get(key).cloned(),
            Self::Undef | Self::Unset => None,
        }
    }
}

impl From<Value> for ManifestDefault {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Undef,
            Value::String(s) if s == UNSET => Self::Unset,
            Value::String(s) if s.starts_with(REFERENCE_PREFIX) && s.len() > 1 => {
                Self::Reference(s[1..].to_owned())
            }
            other => Self::Literal(other),
        }
    }
}

impl From<ManifestDefault> for Value {
    fn from(default: ManifestDefault) -> Self {
        match default {
            ManifestDefault::Literal(value) => value,
            ManifestDefault::Undef => Self::Null,
            ManifestDefault::Unset => Self::String(UNSET.to_owned()),
            ManifestDefault::Reference(key) => Self::String(format!("{REFERENCE_PREFIX}{key}")),
        }
    }
}
