use serde::{Deserialize, Serialize};

/// Configuration for field validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Earliest calendar year accepted in date fields.
    pub min_year: i32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { min_year: 2024 }
    }
}
