use std::collections::BTreeMap;
use std::sync::Arc;

use anvil_validator::log::LogSink;
use serde_json::Value;

use crate::declaration::{Manifest, ParameterDeclaration, RuleDeclaration};
use crate::default::ManifestDefault;
use crate::error::ParameterError;
use crate::parameter::Parameter;
use crate::rule::ValidationRule;
use crate::values::ParameterValues;

/// Result of validating one parameter in [`ParameterCollection::validate_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub name: String,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The parameters of one installer module together with the module-wide
/// validation rules.
#[derive(Debug, Clone, Default)]
pub struct ParameterCollection {
    parameters: Vec<Parameter>,
    rules: Vec<ValidationRule>,
}

impl ParameterCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from parsed declarations.
    pub fn from_declarations(
        parameters: impl IntoIterator<Item = ParameterDeclaration>,
        rules: impl IntoIterator<Item = RuleDeclaration>,
    ) -> Result<Self, ParameterError> {
        let mut collection = Self::new();
        for declaration in parameters {
            collection.add(Parameter::try_from(declaration)?)?;
        }
        for declaration in rules {
            collection.add_rule(ValidationRule::try_from(declaration)?);
        }
        Ok(collection)
    }

    /// Build a collection from a whole manifest.
    pub fn from_manifest(manifest: Manifest) -> Result<Self, ParameterError> {
        Self::from_declarations(manifest.parameters, manifest.validations)
    }

    /// Add a parameter. Names must be unique.
    pub fn add(&mut self, param: Parameter) -> Result<&mut Self, ParameterError> {
        if self.contains(param.name()) {
            return Err(ParameterError::AlreadyExists {
                key: param.name().to_owned(),
            });
        }
        self.parameters.push(param);
        Ok(self)
    }

    /// Add a module-wide validation rule.
    pub fn add_rule(&mut self, rule: ValidationRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Route every parameter's diagnostics to `logger`.
    pub fn set_logger(&mut self, logger: &Arc<dyn LogSink>) {
        for param in &mut self.parameters {
            param.set_logger(Arc::clone(logger));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.name() == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name() == name)
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(Parameter::name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    #[must_use]
    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    /// Rules that reference parameter `name`.
    pub fn rules_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ValidationRule> {
        self.rules.iter().filter(move |rule| rule.mentions(name))
    }

    /// Snapshot of every parameter's resolved value.
    #[must_use]
    pub fn values(&self) -> ParameterValues {
        self.parameters.iter().collect()
    }

    /// Validate one parameter against the module rules, reading siblings
    /// from their current values.
    pub fn validate(&mut self, name: &str) -> Result<bool, ParameterError> {
        let context = self.values();
        let param = self
            .parameters
            .iter_mut()
            .find(|p| p.name() == name)
            .ok_or_else(|| ParameterError::NotFound {
                key: name.to_owned(),
            })?;
        Ok(param.validate(&self.rules, &context))
    }

    /// Validate every parameter in declaration order. Each one sees the
    /// values cast by those validated before it.
    pub fn validate_all(&mut self) -> Vec<ValidationOutcome> {
        let mut outcomes = Vec::with_capacity(self.parameters.len());
        for index in 0..self.parameters.len() {
            let context = self.values();
            let param = &mut self.parameters[index];
            param.validate(&self.rules, &context);
            outcomes.push(ValidationOutcome {
                name: param.name().to_owned(),
                errors: param.validation_errors().to_vec(),
            });
        }
        outcomes
    }

    /// Whether parameter `name` should be shown, given its siblings' values.
    pub fn visible(&self, name: &str) -> Result<bool, ParameterError> {
        let param = self.get(name).ok_or_else(|| ParameterError::NotFound {
            key: name.to_owned(),
        })?;
        Ok(param.visible(&self.values()))
    }

    /// Names of parameters whose default lives in persisted state.
    #[must_use]
    pub fn dump_defaults_needed(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.dump_default_needed())
            .map(Parameter::name)
            .collect()
    }

    /// Hand the persisted dump to every parameter.
    pub fn apply_dump(&mut self, dump: &BTreeMap<String, Value>) {
        for param in &mut self.parameters {
            param.set_default_from_dump(dump.clone());
        }
    }

    /// Entries to persist so the next run can resolve reference defaults:
    /// lookup key to current value, for every parameter that needs one.
    #[must_use]
    pub fn dump(&self) -> BTreeMap<String, Value> {
        self.parameters
            .iter()
            .filter_map(|p| match p.manifest_default() {
                ManifestDefault::Reference(key) => Some((key.clone(), p.value())),
                _ => None,
            })
            .collect()
    }
}
