/// Error type for validator operations.
///
/// Expected validation failures are never reported through this type: they
/// come back as `false` plus accumulated messages. These variants describe
/// caller bugs and malformed declarations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidatorError {
    /// The requested operation is outside the `validate_*` namespace.
    #[error("unsupported validator operation `{name}`")]
    UnsupportedOperation { name: String },

    /// A declared type name could not be parsed.
    #[error("invalid type name `{type_name}`: {reason}")]
    InvalidTypeName { type_name: String, reason: String },
}

impl ValidatorError {
    /// Broad error category for grouping in logs.
    #[must_use]
    pub fn category(&self) -> &str {
        match self {
            Self::UnsupportedOperation { .. } => "operation",
            Self::InvalidTypeName { .. } => "type",
        }
    }

    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::UnsupportedOperation { .. } => "VALIDATOR_UNSUPPORTED_OPERATION",
            Self::InvalidTypeName { .. } => "VALIDATOR_INVALID_TYPE_NAME",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = ValidatorError::UnsupportedOperation {
            name: "unknown_method".into(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported validator operation `unknown_method`"
        );

        let err = ValidatorError::InvalidTypeName {
            type_name: "Array[".into(),
            reason: "unexpected end of input".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid type name `Array[`: unexpected end of input"
        );
    }

    #[test]
    fn codes_and_categories() {
        let op = ValidatorError::UnsupportedOperation { name: String::new() };
        let ty = ValidatorError::InvalidTypeName {
            type_name: String::new(),
            reason: String::new(),
        };
        assert_eq!(op.category(), "operation");
        assert_eq!(ty.category(), "type");
        assert_ne!(op.code(), ty.code());
        assert!(op.code().starts_with("VALIDATOR_"));
    }
}
