use chrono::{Datelike, NaiveDate};
use scl_types::Field;

use crate::config::GateConfig;
use crate::locations::LocationRegistry;

/// Display format for dates. Input years are two digits and always read
/// as `20yy`.
pub const DATE_FORMAT: &str = "%d/%m/%y";

/// Character that separates fields in exported lines; never allowed in input.
const FORBIDDEN: char = '|';

/// What a single field accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldRule {
    /// Anything (including an empty answer).
    FreeText,
    /// `prefix` followed by exactly five digits, e.g. `SID12345`.
    PrefixedId { prefix: &'static str },
    /// One or more digits.
    Quantity,
    /// `dd/mm/yy`, a real calendar date no earlier than the configured year.
    Date,
    /// A [`FieldRule::Date`] on or after the date given for `field`.
    DateNotBefore { field: &'static str },
    /// One of `options`, case-insensitive; stored lower-case.
    OneOf(&'static [&'static str]),
    /// An integer in `min..=max`.
    IntRange { min: i64, max: i64 },
    /// A `city, state` entry from the location registry.
    Location,
    /// Filled in by the collector, never asked for.
    Generated,
}

/// Everything a rule may consult.
pub struct RuleContext<'a> {
    pub config: &'a GateConfig,
    pub locations: &'a LocationRegistry,
    /// Answers already given for the current form.
    pub collected: &'a [Field],
}

impl FieldRule {
    /// Returns `true` if the user is asked for this field.
    pub fn is_prompted(&self) -> bool {
        !matches!(self, Self::Generated)
    }

    pub fn needs_locations(&self) -> bool {
        matches!(self, Self::Location)
    }

    /// Check `raw` and return the value to store, or the reason it was
    /// refused.
    pub fn check(&self, raw: &str, ctx: &RuleContext<'_>) -> Result<String, String> {
        if raw.contains(FORBIDDEN) {
            return Err(format!("must not contain '{FORBIDDEN}'"));
        }

        match self {
            Self::FreeText | Self::Generated => Ok(raw.to_string()),
            Self::PrefixedId { prefix } => {
                let digits = raw
                    .strip_prefix(prefix)
                    .filter(|rest| rest.len() == 5 && rest.bytes().all(|b| b.is_ascii_digit()));
                match digits {
                    Some(_) => Ok(raw.to_string()),
                    None => Err(format!("expected {prefix} followed by 5 digits")),
                }
            }
            Self::Quantity => {
                if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
                    Ok(raw.to_string())
                } else {
                    Err("expected a whole number".into())
                }
            }
            Self::Date => parse_date(raw, ctx.config).map(|_| raw.to_string()),
            Self::DateNotBefore { field } => {
                let date = parse_date(raw, ctx.config)?;
                let earlier = ctx
                    .collected
                    .iter()
                    .rev()
                    .find(|f| f.name == *field)
                    .and_then(|f| calendar_date(&f.value));
                match earlier {
                    Some(earlier) if date < earlier => {
                        Err(format!("must be on or after {field} ({})", earlier.format(DATE_FORMAT)))
                    }
                    _ => Ok(raw.to_string()),
                }
            }
            Self::OneOf(options) => {
                let lowered = raw.trim().to_lowercase();
                if options.contains(&lowered.as_str()) {
                    Ok(lowered)
                } else {
                    Err(format!("expected one of: {}", options.join(", ")))
                }
            }
            Self::IntRange { min, max } => match raw.trim().parse::<i64>() {
                Ok(n) if (*min..=*max).contains(&n) => Ok(n.to_string()),
                _ => Err(format!("expected a number between {min} and {max}")),
            },
            Self::Location => {
                let location = raw.trim();
                if ctx.locations.contains(location) {
                    Ok(location.to_string())
                } else {
                    Err("expected a known location in the format 'city, state'".into())
                }
            }
        }
    }
}

fn parse_date(raw: &str, config: &GateConfig) -> Result<NaiveDate, String> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 8
        && bytes[2] == b'/'
        && bytes[5] == b'/'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit());
    if !shaped {
        return Err("expected format dd/mm/yy".into());
    }

    let date = calendar_date(raw).ok_or_else(|| "not a valid calendar date".to_string())?;
    if date.year() < config.min_year {
        return Err(format!("year must be {} or later", config.min_year));
    }
    Ok(date)
}

/// `dd/mm/yy` with the year in 2000..=2099.
fn calendar_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.splitn(3, '/').map(str::parse::<u32>);
    let (day, month, year) = (parts.next()?.ok()?, parts.next()?.ok()?, parts.next()?.ok()?);
    if year > 99 {
        return None;
    }
    NaiveDate::from_ymd_opt(2000 + year as i32, month, day)
}
