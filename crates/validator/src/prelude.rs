//! Prelude module for convenient imports.
//!
//! ```rust
//! use anvil_validator::prelude::*;
//! ```

pub use crate::data_type::DataType;
pub use crate::error::ValidatorError;
pub use crate::functions::ArgumentStyle;
pub use crate::log::{LogEntry, LogSink, MemorySink, NullSink, TracingSink};
pub use crate::validator::{FunctionName, Validator};
pub use crate::value::{inspect, is_truthy, to_display};
