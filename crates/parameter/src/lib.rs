//! # anvil-parameter
//!
//! Installer parameters: default resolution, value normalization, validation
//! through declared types and legacy rules, and visibility conditions.
//!
//! ```rust
//! use anvil_parameter::prelude::*;
//! use serde_json::json;
//!
//! let mut params = ParameterCollection::new();
//! params
//!     .add(Parameter::new("db_type").with_manifest_default(json!("sqlite")))?
//!     .add(Parameter::new("db_host").with_condition("$db_type != 'sqlite'")?)?;
//! params.add_rule(ValidationRule::new(
//!     "validate_re",
//!     [json!("$db_type"), json!(["^mysql$", "^sqlite$"]), json!("invalid $db_type DB type")],
//! )?);
//!
//! assert!(params.validate("db_type")?);
//! assert!(!params.visible("db_host")?);
//!
//! params.get_mut("db_type").unwrap().set_value("oracle");
//! assert!(!params.validate("db_type")?);
//! assert_eq!(
//!     params.get("db_type").unwrap().validation_error_report(),
//!     ["Parameter db_type invalid: invalid oracle DB type"]
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod collection;
pub mod condition;
pub mod declaration;
pub mod default;
pub mod error;
pub mod group;
pub mod normalize;
pub mod parameter;
pub mod rule;
pub mod values;

pub use parameter::Parameter;

pub mod prelude {
    pub use crate::collection::{ParameterCollection, ValidationOutcome};
    pub use crate::condition::{Condition, ConditionError};
    pub use crate::declaration::{Manifest, ParameterDeclaration, RuleDeclaration};
    pub use crate::default::ManifestDefault;
    pub use crate::error::ParameterError;
    pub use crate::group::ParamGroup;
    pub use crate::normalize::{RawValue, StringLike, StyledString};
    pub use crate::parameter::Parameter;
    pub use crate::rule::{RuleArgument, ValidationRule};
    pub use crate::values::ParameterValues;

    pub use anvil_validator::log::{LogSink, MemorySink, TracingSink};
}
