// Recurrence module
// Frequency + end date pair describing how a definition repeats

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound on occurrences produced from a single definition.
pub const MAX_OCCURRENCES: usize = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    /// Accepts the stored lowercase names as well as RRULE-style `FREQ=` values.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let name = trimmed.strip_prefix("FREQ=").unwrap_or(trimmed);
        match name.to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(format!("Unrecognized recurrence frequency '{}'", value)),
        }
    }
}

/// How a definition expands into dated occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Last date (inclusive) an occurrence may fall on
    pub until: NaiveDate,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency, until: NaiveDate) -> Self {
        Self { frequency, until }
    }

    pub fn daily(until: NaiveDate) -> Self {
        Self::new(Frequency::Daily, until)
    }

    pub fn weekly(until: NaiveDate) -> Self {
        Self::new(Frequency::Weekly, until)
    }

    pub fn monthly(until: NaiveDate) -> Self {
        Self::new(Frequency::Monthly, until)
    }

    /// Validate the rule against the definition's anchor date
    pub fn validate(&self, anchor: NaiveDate) -> Result<(), String> {
        if self.until < anchor {
            return Err(format!(
                "Recurrence end {} is before the anchor date {}",
                self.until, anchor
            ));
        }
        Ok(())
    }

    /// Parse a stored `(frequency, until)` pair. Returns `None` when the
    /// frequency is not one we know how to expand.
    pub fn from_parts(frequency: &str, until: NaiveDate) -> Option<Self> {
        match frequency.parse::<Frequency>() {
            Ok(frequency) => Some(Self { frequency, until }),
            Err(e) => {
                log::warn!("{}; treating definition as non-recurring", e);
                None
            }
        }
    }
}
