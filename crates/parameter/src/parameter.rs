//! A single configuration parameter and its value lifecycle.
//!
//! ```text
//! manifest default ──┐
//! persisted dump ────┼──> default() ──┐
//! set_default() ─────┘                ├──> value() ──> typecast ──> validate()
//! set_value() ────────────────────────┘
//! ```
//!
//! Until [`Parameter::set_value`] is called the resolved value falls back to
//! the default. Validation casts the value through the declared type and
//! keeps the cast result, so a manifest default of `"2"` on an `Integer`
//! parameter reads as `2` from then on.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use anvil_validator::data_type::DataType;
use anvil_validator::log::{LogSink, TracingSink};
use anvil_validator::value::to_display;
use anvil_validator::Validator;
use serde_json::Value;

use crate::condition::Condition;
use crate::default::ManifestDefault;
use crate::error::ParameterError;
use crate::group::ParamGroup;
use crate::normalize::RawValue;
use crate::rule::ValidationRule;
use crate::values::ParameterValues;

/// Rules calling the bridge by name already carry their own type.
const BRIDGE_FUNCTION: &str = "validate_legacy";

#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    type_name: Option<String>,
    data_type: Option<DataType>,
    manifest_default: ManifestDefault,
    dumped_default: BTreeMap<String, Value>,
    default_override: Option<Value>,
    value: Value,
    value_set: bool,
    condition: Option<Condition>,
    groups: Vec<ParamGroup>,
    validation_errors: Vec<String>,
    logger: Arc<dyn LogSink>,
}

impl Parameter {
    /// Untyped parameter with no default, reporting through `tracing`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            data_type: None,
            manifest_default: ManifestDefault::Undef,
            dumped_default: BTreeMap::new(),
            default_override: None,
            value: Value::Null,
            value_set: false,
            condition: None,
            groups: Vec::new(),
            validation_errors: Vec::new(),
            logger: TracingSink::shared(),
        }
    }

    // ── Builders ────────────────────────────────────────────────────────

    pub fn with_type(mut self, type_name: &str) -> Result<Self, ParameterError> {
        self.set_type(Some(type_name))?;
        Ok(self)
    }

    #[must_use]
    pub fn with_manifest_default(mut self, default: impl Into<ManifestDefault>) -> Self {
        self.manifest_default = default.into();
        self
    }

    pub fn with_condition(mut self, condition: &str) -> Result<Self, ParameterError> {
        self.set_condition(Some(condition))?;
        Ok(self)
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn LogSink>) -> Self {
        self.logger = logger;
        self
    }

    // ── Declaration ─────────────────────────────────────────────────────

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type name; `None` means legacy functions alone decide.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    #[must_use]
    pub fn data_type(&self) -> Option<&DataType> {
        self.data_type.as_ref()
    }

    pub fn set_type(&mut self, type_name: Option<&str>) -> Result<(), ParameterError> {
        self.data_type = type_name
            .map(DataType::from_type_name)
            .transpose()
            .map_err(|err| ParameterError::invalid_type(&self.name, err))?;
        self.type_name = type_name.map(str::to_owned);
        Ok(())
    }

    #[must_use]
    pub fn manifest_default(&self) -> &ManifestDefault {
        &self.manifest_default
    }

    pub fn set_manifest_default(&mut self, default: impl Into<ManifestDefault>) {
        self.manifest_default = default.into();
    }

    /// Source text of the visibility condition.
    #[must_use]
    pub fn condition(&self) -> Option<&str> {
        self.condition.as_ref().map(Condition::source)
    }

    /// Parse and attach a visibility condition; `None` removes it.
    pub fn set_condition(&mut self, condition: Option<&str>) -> Result<(), ParameterError> {
        self.condition = condition
            .map(Condition::parse)
            .transpose()
            .map_err(|source| ParameterError::InvalidCondition {
                key: self.name.clone(),
                source,
            })?;
        Ok(())
    }

    #[must_use]
    pub fn groups(&self) -> &[ParamGroup] {
        &self.groups
    }

    /// `None` clears the memberships.
    pub fn set_groups(&mut self, groups: Option<Vec<ParamGroup>>) {
        self.groups = groups.unwrap_or_default();
    }

    #[must_use]
    pub fn logger(&self) -> &Arc<dyn LogSink> {
        &self.logger
    }

    pub fn set_logger(&mut self, logger: Arc<dyn LogSink>) {
        self.logger = logger;
    }

    // ── Defaults ────────────────────────────────────────────────────────

    /// The default this parameter falls back to when no value is set.
    ///
    /// An explicit [`set_default`](Self::set_default) wins; otherwise the
    /// manifest default is resolved against the persisted dump.
    #[must_use]
    pub fn default(&self) -> Option<Value> {
        match &self.default_override {
            Some(value) => Some(value.clone()),
            None => self.manifest_default.resolve(&self.dumped_default),
        }
    }

    /// Override the resolved default. `None` drops the override and returns
    /// to manifest resolution.
    pub fn set_default(&mut self, default: Option<Value>) {
        self.default_override = default;
    }

    /// Whether the default comes from persisted state and must be dumped
    /// for the next run to recover it.
    #[must_use]
    pub fn dump_default_needed(&self) -> bool {
        self.manifest_default.is_reference()
    }

    #[must_use]
    pub fn dumped_default(&self) -> &BTreeMap<String, Value> {
        &self.dumped_default
    }

    pub fn set_default_from_dump(&mut self, dump: BTreeMap<String, Value>) {
        self.dumped_default = dump;
    }

    // ── Value ───────────────────────────────────────────────────────────

    /// The resolved value: the assigned one once set, otherwise the default,
    /// otherwise `null`.
    #[must_use]
    pub fn value(&self) -> Value {
        if self.value_set {
            self.value.clone()
        } else {
            self.default().unwrap_or(Value::Null)
        }
    }

    /// Whether a value has been assigned, even one that is `null`.
    #[must_use]
    pub fn is_value_set(&self) -> bool {
        self.value_set
    }

    /// Assign a value, stripping front end decoration first.
    pub fn set_value(&mut self, value: impl Into<RawValue>) {
        self.value = value.into().normalize();
        self.value_set = true;
    }

    /// Forget the assigned value so reads fall back to the default.
    pub fn unset_value(&mut self) {
        self.value = Value::Null;
        self.value_set = false;
    }

    /// The value as text, for use as an atom in other parameters'
    /// conditions.
    #[must_use]
    pub fn condition_value(&self) -> String {
        to_display(&self.value())
    }

    // ── Validation ──────────────────────────────────────────────────────

    /// Messages from the most recent [`validate`](Self::validate) call.
    #[must_use]
    pub fn validation_errors(&self) -> &[String] {
        &self.validation_errors
    }

    /// One `Parameter NAME invalid: MESSAGE` line per validation error.
    #[must_use]
    pub fn validation_error_report(&self) -> Vec<String> {
        self.validation_errors
            .iter()
            .map(|error| format!("Parameter {} invalid: {error}", self.name))
            .collect()
    }

    /// Cast the value through the declared type, then run every rule in
    /// `rules` that references this parameter.
    ///
    /// `context` supplies sibling values; this parameter's own value is
    /// always taken from `self`. A rule whose value under test is this
    /// parameter is reconciled with the declared type; a rule testing a
    /// sibling's value runs as is. Rebuilds [`validation_errors`] from
    /// scratch and returns whether it ended up empty.
    ///
    /// [`validation_errors`]: Self::validation_errors
    pub fn validate<'r>(
        &mut self,
        rules: impl IntoIterator<Item = &'r ValidationRule>,
        context: &ParameterValues,
    ) -> bool {
        let mut errors = Vec::new();

        let cast = self.data_type.as_ref().map(|data_type| {
            let cast = data_type.typecast(&self.value());
            data_type.is_valid(&cast, &mut errors);
            cast
        });
        if let Some(cast) = cast {
            self.store_cast(cast);
        }
        for error in &errors {
            self.logger.error(&format!("Validation error: {error}"));
        }
        let structurally_valid = errors.is_empty();

        let context = context.clone().with_value(self.name.clone(), self.value());
        for rule in rules.into_iter().filter(|rule| rule.mentions(&self.name)) {
            // Only the owner's own value can be reconciled with its type.
            let bridged = rule.function().as_str() != BRIDGE_FUNCTION
                && rule.tests_value_of(&self.name);
            if bridged && self.data_type.is_some() && !structurally_valid {
                // The type already failed; the legacy verdict cannot save it.
                continue;
            }

            let args = rule.arguments_for(&self.name, &context);
            let mut validator = Validator::new(Arc::clone(&self.logger));
            let valid = match (&self.data_type, args.split_first()) {
                (Some(data_type), Some((value, extra))) if bridged => {
                    validator.validate_legacy_with(data_type, rule.function(), value, extra)
                }
                _ => validator.dispatch(rule.function(), &args),
            };
            if !valid {
                errors.extend(validator.into_errors());
            }
        }

        let mut seen = HashSet::new();
        errors.retain(|error| seen.insert(error.clone()));
        self.validation_errors = errors;
        self.validation_errors.is_empty()
    }

    fn store_cast(&mut self, cast: Value) {
        if self.value_set {
            self.value = cast;
        } else if let Some(default) = self.default()
            && default != cast
        {
            self.default_override = Some(cast);
        }
    }

    // ── Visibility ──────────────────────────────────────────────────────

    /// Evaluate the visibility condition against `context`.
    ///
    /// Without a condition the parameter is always visible.
    #[must_use]
    pub fn visible(&self, context: &ParameterValues) -> bool {
        self.condition.as_ref().is_none_or(|condition| {
            condition.evaluate(|name| {
                if name == self.name {
                    Some(self.value())
                } else {
                    context.get(name).cloned()
                }
            })
        })
    }
}
