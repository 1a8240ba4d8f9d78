use anvil_validator::ValidatorError;

use crate::condition::ConditionError;

/// Error type for parameter operations.
///
/// Failed validation is not an error: [`Parameter::validate`] reports it as
/// `false` plus messages. These variants cover malformed declarations,
/// lookups and conditions.
///
/// [`Parameter::validate`]: crate::Parameter::validate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    /// Declared type name could not be parsed.
    #[error("invalid type for `{key}`: {reason}")]
    InvalidTypeName { key: String, reason: String },

    /// Parameter with the given name was not found.
    #[error("parameter not found: `{key}`")]
    NotFound { key: String },

    /// A parameter with the given name already exists.
    #[error("parameter already exists: `{key}`")]
    AlreadyExists { key: String },

    /// Visibility condition could not be parsed.
    #[error("invalid condition for `{key}`: {source}")]
    InvalidCondition {
        key: String,
        #[source]
        source: ConditionError,
    },

    /// A validation rule names something other than a `validate_*` function.
    #[error("invalid validation rule `{function}`: {reason}")]
    InvalidRule { function: String, reason: String },

    /// Failed to deserialize declarations or persisted state.
    #[error("deserialization failed: {error}")]
    DeserializationError { error: String },
}

impl ParameterError {
    pub(crate) fn invalid_type(key: &str, err: ValidatorError) -> Self {
        let reason = match err {
            ValidatorError::InvalidTypeName { reason, .. } => reason,
            other => other.to_string(),
        };
        Self::InvalidTypeName {
            key: key.to_owned(),
            reason,
        }
    }

    /// Broad error category for grouping in logs.
    #[must_use]
    pub fn category(&self) -> &str {
        match self {
            Self::InvalidTypeName { .. } => "type",
            Self::NotFound { .. } => "lookup",
            Self::AlreadyExists { .. } => "lookup",
            Self::InvalidCondition { .. } => "condition",
            Self::InvalidRule { .. } => "validation",
            Self::DeserializationError { .. } => "serialization",
        }
    }

    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidTypeName { .. } => "PARAM_INVALID_TYPE",
            Self::NotFound { .. } => "PARAM_NOT_FOUND",
            Self::AlreadyExists { .. } => "PARAM_ALREADY_EXISTS",
            Self::InvalidCondition { .. } => "PARAM_INVALID_CONDITION",
            Self::InvalidRule { .. } => "PARAM_INVALID_RULE",
            Self::DeserializationError { .. } => "PARAM_DESER",
        }
    }
}

impl From<serde_json::Error> for ParameterError {
    fn from(err: serde_json::Error) -> Self {
        Self::DeserializationError {
            error: err.to_string(),
        }
    }
}
