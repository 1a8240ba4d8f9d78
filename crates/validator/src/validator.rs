//! The legacy validation function dispatcher.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ValidatorError;
use crate::functions::{self, ArgumentStyle};
use crate::log::{LogSink, TracingSink};

/// Prefix every legacy validation function name carries.
pub const FUNCTION_PREFIX: &str = "validate_";

/// Name of a legacy validation function, guaranteed to live in the
/// `validate_*` namespace.
///
/// Anything else is a caller bug and is rejected here, so dispatching a
/// [`FunctionName`] never has to fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionName(String);

impl FunctionName {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidatorError> {
        let name = name.into();
        match name.strip_prefix(FUNCTION_PREFIX) {
            Some(rest) if !rest.is_empty() => Ok(Self(name)),
            _ => Err(ValidatorError::UnsupportedOperation { name }),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this engine implements the function.
    #[must_use]
    pub fn is_known(&self) -> bool {
        functions::lookup(&self.0).is_some()
    }

    /// How the function reads its arguments. Functions this engine does not
    /// implement are treated as positional.
    #[must_use]
    pub fn argument_style(&self) -> ArgumentStyle {
        functions::lookup(&self.0).map_or(ArgumentStyle::Positional, |f| f.style)
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FunctionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Runs legacy validation functions and collects their error messages.
///
/// A validator is cheap and meant to be short-lived: create one per
/// reconciliation and read [`errors`](Self::errors) afterwards.
#[derive(Debug, Clone)]
pub struct Validator {
    pub(crate) errors: Vec<String>,
    pub(crate) logger: Arc<dyn LogSink>,
    log_errors: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(TracingSink::shared())
    }
}

impl Validator {
    #[must_use]
    pub fn new(logger: Arc<dyn LogSink>) -> Self {
        Self {
            errors: Vec::new(),
            logger,
            log_errors: true,
        }
    }

    /// A validator that records failures without logging them. Problems
    /// with the rule itself, such as a pattern that does not compile, are
    /// still reported to `logger`.
    pub(crate) fn quiet(logger: Arc<dyn LogSink>) -> Self {
        Self {
            log_errors: false,
            ..Self::new(logger)
        }
    }

    /// Messages recorded by failed validations, oldest first.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[must_use]
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    /// The sink this validator reports to.
    #[must_use]
    pub fn logger(&self) -> &Arc<dyn LogSink> {
        &self.logger
    }

    /// Invoke a validation function by name.
    ///
    /// Unknown `validate_*` functions pass; names outside that namespace fail
    /// with [`ValidatorError::UnsupportedOperation`].
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<bool, ValidatorError> {
        let function = FunctionName::new(name)?;
        Ok(self.dispatch(&function, args))
    }

    /// Invoke a validation function whose name is already known to be in the
    /// `validate_*` namespace.
    pub fn dispatch(&mut self, function: &FunctionName, args: &[Value]) -> bool {
        match functions::lookup(function.as_str()) {
            Some(entry) => (entry.handler)(self, args),
            None => {
                self.skip_unknown(function);
                true
            }
        }
    }

    pub(crate) fn skip_unknown(&self, function: &FunctionName) {
        self.logger.trace(&format!(
            "Skipping validation with {function} as it's not implemented"
        ));
    }

    /// Record a failure: kept on the error list and logged at error level.
    pub(crate) fn error(&mut self, message: String) {
        if self.log_errors {
            self.logger.error(&format!("Validation error: {message}"));
        }
        self.errors.push(message);
    }
}
