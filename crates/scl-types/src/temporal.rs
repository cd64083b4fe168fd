use std::fmt;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Creation time of a block, kept as the string it is displayed with.
///
/// The format follows the classic `ctime` layout without the trailing
/// newline, e.g. `Tue Mar  5 09:07:01 2024`. Once captured the value is never
/// re-parsed or mutated.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// `strftime` pattern used for captured timestamps.
    pub const FORMAT: &'static str = "%a %b %e %H:%M:%S %Y";

    /// Capture the current local time.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// Render an explicit instant.
    pub fn from_datetime<Tz: TimeZone>(at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(at.format(Self::FORMAT).to_string())
    }

    /// Wrap a timestamp string read back from an export.
    pub fn from_display(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
