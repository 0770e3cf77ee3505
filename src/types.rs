//! Core types for spark-page.
//!
//! These are the values that flow from the state systems out to whatever
//! renders the page. All of them are plain data: cheap to clone, comparable,
//! and free of host references.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Target Instant
// =============================================================================

/// The fixed point in time a countdown runs towards.
///
/// Carries its own UTC offset so the page author can write the event time the
/// way it appears on the poster (`2024-09-26T12:40:00+05:30`). Serializes as an
/// RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetInstant(DateTime<FixedOffset>);

impl TargetInstant {
    pub const fn new(at: DateTime<FixedOffset>) -> Self {
        Self(at)
    }

    /// Parse an RFC 3339 date-time with an explicit offset.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(Self)
    }

    /// The instant as written, offset included.
    pub fn at(&self) -> DateTime<FixedOffset> {
        self.0
    }

    /// Signed milliseconds from `now` until this instant.
    ///
    /// Negative once the instant has passed.
    pub fn millis_until(&self, now: DateTime<Utc>) -> i64 {
        self.0.signed_duration_since(now).num_milliseconds()
    }
}

impl From<DateTime<FixedOffset>> for TargetInstant {
    fn from(at: DateTime<FixedOffset>) -> Self {
        Self(at)
    }
}

impl fmt::Display for TargetInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// =============================================================================
// Region Id
// =============================================================================

/// Identifies one watched page region (a section that fades in on scroll).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RegionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Countdown Snapshot
// =============================================================================

/// Whole days/hours/minutes/seconds remaining until a [`TargetInstant`].
///
/// `hours` is always 0-23, `minutes` and `seconds` 0-59. After expiry the
/// snapshot is [`CountdownSnapshot::ZERO`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CountdownSnapshot {
    pub days: u64,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl CountdownSnapshot {
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Total whole seconds represented by this snapshot.
    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400
            + u64::from(self.hours) * 3_600
            + u64::from(self.minutes) * 60
            + u64::from(self.seconds)
    }

    /// The four labelled fields in display order: days, hours, minutes, seconds.
    pub fn units(&self) -> [CountdownUnit; 4] {
        [
            CountdownUnit { label: "days", value: self.days },
            CountdownUnit { label: "hours", value: u64::from(self.hours) },
            CountdownUnit { label: "minutes", value: u64::from(self.minutes) },
            CountdownUnit { label: "seconds", value: u64::from(self.seconds) },
        ]
    }
}

impl fmt::Display for CountdownSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// One labelled countdown field, as shown under the big digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownUnit {
    pub label: &'static str,
    pub value: u64,
}

impl CountdownUnit {
    /// Value zero-padded to at least two digits ("07", "42", "123").
    pub fn padded(&self) -> String {
        format!("{:02}", self.value)
    }
}

// =============================================================================
// Reveal State
// =============================================================================

/// Visual state of a watched region.
///
/// Only ever moves `Hidden -> Revealed`, once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RevealState {
    #[default]
    Hidden,
    Revealed,
}

impl RevealState {
    pub fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }
}

// =============================================================================
// Tests
// =============================================================================
