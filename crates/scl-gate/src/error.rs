use std::io;
use std::path::PathBuf;

/// Errors that can occur while collecting stage fields.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// A value failed its field rule.
    #[error("invalid {field}: {reason}")]
    Invalid { field: String, reason: String },

    /// The input ran out before the form was complete.
    #[error("input closed while collecting {field}")]
    InputClosed { field: String },

    /// The form needs known locations but none could be loaded.
    #[error("unable to open valid locations file {path}: {source}")]
    Locations { path: PathBuf, source: io::Error },

    /// The form needs known locations but the registry is empty.
    #[error("no valid locations are configured")]
    NoLocations,

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl GateError {
    /// Create a validation error with a field name and reason.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
