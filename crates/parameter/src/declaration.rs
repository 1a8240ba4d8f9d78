//! Serde surface for already-parsed manifest declarations and persisted
//! state.
//!
//! ```rust
//! use anvil_parameter::prelude::*;
//!
//! let manifest = Manifest::from_json(r#"{
//!     "parameters": [
//!         {"name": "pool_size", "type": "Integer", "default": "5"}
//!     ],
//!     "validations": [
//!         {"function": "validate_integer", "arguments": ["$pool_size", 10, 1]}
//!     ]
//! }"#).unwrap();
//!
//! let mut params = ParameterCollection::from_manifest(manifest).unwrap();
//! assert!(params.validate("pool_size").unwrap());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::default::ManifestDefault;
use crate::error::ParameterError;
use crate::group::ParamGroup;
use crate::parameter::Parameter;
use crate::rule::ValidationRule;

/// Persisted values keyed by dotted lookup path (`mod::params::name`).
pub type Dump = BTreeMap<String, Value>;

/// Parse a persisted-state dump.
pub fn dump_from_json(json: &str) -> Result<Dump, ParameterError> {
    Ok(serde_json::from_str(json)?)
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDeclaration {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub default: ManifestDefault,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

/// One declared validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDeclaration {
    pub function: String,
    #[serde(default)]
    pub arguments: Vec<Value>,
}

/// Everything one module declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub parameters: Vec<ParameterDeclaration>,
    #[serde(default)]
    pub validations: Vec<RuleDeclaration>,
}

impl Manifest {
    pub fn from_json(json: &str) -> Result<Self, ParameterError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TryFrom<ParameterDeclaration> for Parameter {
    type Error = ParameterError;

    fn try_from(declaration: ParameterDeclaration) -> Result<Self, Self::Error> {
        let mut param = Self::new(declaration.name);
        param.set_type(declaration.type_name.as_deref())?;
        param.set_manifest_default(declaration.default);
        param.set_condition(declaration.condition.as_deref())?;
        param.set_groups(Some(
            declaration.groups.into_iter().map(ParamGroup::new).collect(),
        ));
        Ok(param)
    }
}

impl TryFrom<RuleDeclaration> for ValidationRule {
    type Error = ParameterError;

    fn try_from(declaration: RuleDeclaration) -> Result<Self, Self::Error> {
        Self::new(&declaration.function, declaration.arguments).map_err(|err| {
            ParameterError::InvalidRule {
                function: declaration.function.clone(),
                reason: err.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_declaration() {
        let decl: ParameterDeclaration = serde_json::from_value(json!({"name": "x"})).unwrap();
        assert_eq!(decl.type_name, None);
        assert_eq!(decl.default, ManifestDefault::Undef);
        assert!(decl.groups.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_value::<ParameterDeclaration>(json!({"name": "x", "kind": 1}));
        assert!(err.is_err());
    }

    #[test]
    fn declaration_becomes_parameter() {
        let decl: ParameterDeclaration = serde_json::from_value(json!({
            "name": "db_type",
            "type": "Enum['mysql', 'sqlite']",
            "default": "$mod::params::db_type",
            "condition": "$enabled",
            "groups": ["Database"]
        }))
        .unwrap();
        let param = Parameter::try_from(decl).unwrap();
        assert_eq!(param.type_name(), Some("Enum['mysql', 'sqlite']"));
        assert!(param.dump_default_needed());
        assert_eq!(param.condition(), Some("$enabled"));
        assert_eq!(param.groups()[0].name(), "Database");
    }

    #[test]
    fn bad_type_surfaces_as_parameter_error() {
        let decl: ParameterDeclaration =
            serde_json::from_value(json!({"name": "x", "type": "Optional"})).unwrap();
        assert_eq!(Parameter::try_from(decl).unwrap_err().code(), "PARAM_INVALID_TYPE");
    }

    #[test]
    fn bad_condition_surfaces_as_parameter_error() {
        let decl: ParameterDeclaration =
            serde_json::from_value(json!({"name": "x", "condition": "$a == "})).unwrap();
        assert_eq!(
            Parameter::try_from(decl).unwrap_err().code(),
            "PARAM_INVALID_CONDITION"
        );
    }

    #[test]
    fn bad_function_surfaces_as_rule_error() {
        let decl = RuleDeclaration {
            function: "fail".into(),
            arguments: vec![json!("$x")],
        };
        let err = ValidationRule::try_from(decl).unwrap_err();
        assert_eq!(err.code(), "PARAM_INVALID_RULE");
    }

    #[test]
    fn dump_parses() {
        let dump = dump_from_json(r#"{"mod::params::test": "42"}"#).unwrap();
        assert_eq!(dump.get("mod::params::test"), Some(&json!("42")));
        assert_eq!(dump_from_json("[1]").unwrap_err().code(), "PARAM_DESER");
    }
}
