//! Reconciliation between declared data types and legacy validation
//! functions.
//!
//! Installers are migrating from ad-hoc `validate_*` calls to declared types.
//! A value only fails when both mechanisms reject it:
//!
//! | data type | legacy function | outcome                                   |
//! |-----------|-----------------|-------------------------------------------|
//! | valid     | valid           | pass                                      |
//! | valid     | invalid         | pass, debug note with the legacy errors   |
//! | invalid   | valid           | pass, deprecation warning                 |
//! | invalid   | invalid         | fail, data type errors become the errors  |

use std::sync::Arc;

use serde_json::Value;

use crate::data_type::DataType;
use crate::error::ValidatorError;
use crate::validator::{FunctionName, Validator};
use crate::value::inspect;

impl Validator {
    /// Reconcile `type_name` with the legacy `function` for `value`.
    ///
    /// `extra` holds the function's remaining arguments (bounds, patterns,
    /// messages). Fails only when the type name is malformed or `function`
    /// is outside the `validate_*` namespace.
    pub fn validate_legacy(
        &mut self,
        type_name: &str,
        function: &str,
        value: &Value,
        extra: &[Value],
    ) -> Result<bool, ValidatorError> {
        let data_type = DataType::from_type_name(type_name)?;
        let function = FunctionName::new(function)?;
        Ok(self.validate_legacy_with(&data_type, &function, value, extra))
    }

    /// [`validate_legacy`](Self::validate_legacy) with an already built
    /// descriptor.
    pub fn validate_legacy_with(
        &mut self,
        data_type: &DataType,
        function: &FunctionName,
        value: &Value,
        extra: &[Value],
    ) -> bool {
        let mut dt_errors = Vec::new();
        let dt_valid = data_type.is_valid(&data_type.typecast(value), &mut dt_errors);

        // Findings are re-reported below at the severity the reconciliation
        // decides on.
        let mut legacy = Validator::quiet(Arc::clone(&self.logger));
        let func_valid = if function.is_known() {
            let mut args = Vec::with_capacity(extra.len() + 1);
            args.push(value.clone());
            args.extend_from_slice(extra);
            legacy.dispatch(function, &args)
        } else {
            self.skip_unknown(function);
            true
        };

        match (dt_valid, func_valid) {
            (true, true) => true,
            (true, false) => {
                self.logger.debug(&format!(
                    "Value {} was accepted as it matches data types, but failed when validated against {function}",
                    inspect(value)
                ));
                for error in legacy.errors() {
                    self.logger
                        .debug(&format!("Legacy validation error: {error}"));
                }
                true
            }
            (false, true) => {
                self.logger.warn(&format!(
                    "Value {} was accepted, but will not be valid in future versions - ensure it matches {data_type}",
                    inspect(value)
                ));
                for error in &dt_errors {
                    self.logger.warn(&format!("Validation error: {error}"));
                }
                true
            }
            (false, false) => {
                for error in dt_errors {
                    self.error(error);
                }
                false
            }
        }
    }
}
