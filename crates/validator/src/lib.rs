//! # anvil-validator
//!
//! Structural data types, legacy validation functions, and the policy that
//! reconciles the two for installer parameters.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use anvil_validator::prelude::*;
//! use serde_json::json;
//!
//! let sink = Arc::new(MemorySink::new());
//! let mut validator = Validator::new(sink.clone());
//!
//! // Declared type and legacy function agree: plain pass.
//! assert!(validator
//!     .validate_legacy("Integer", "validate_integer", &json!(1), &[])
//!     .unwrap());
//!
//! // Both reject the value: the data type's message is reported.
//! assert!(!validator
//!     .validate_legacy("Integer", "validate_integer", &json!("foo"), &[])
//!     .unwrap());
//! assert_eq!(validator.errors(), [r#""foo" is not a valid integer"#]);
//! ```
//!
//! ## Pieces
//!
//! - [`data_type`]: type-name parser and [`DataType`](data_type::DataType)
//!   descriptors (`typecast` + `is_valid`).
//! - [`Validator`]: one method per legacy `validate_*` function, dispatched
//!   through an explicit registry in [`functions`].
//! - [`legacy`]: the reconciliation matrix behind
//!   [`Validator::validate_legacy`].
//! - [`log`]: the sink validators report to.

pub mod data_type;
pub mod error;
pub mod functions;
pub mod legacy;
pub mod log;
pub mod prelude;
mod validator;
pub mod value;

pub use error::ValidatorError;
pub use validator::{FUNCTION_PREFIX, FunctionName, Validator};
