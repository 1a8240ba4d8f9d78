use serde::{Deserialize, Serialize};

/// A named group a parameter is listed under (for example in help output).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamGroup {
    name: String,
}

impl ParamGroup {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
