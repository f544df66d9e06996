//! Fixed sampling intervals.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, TimeDelta, Timelike};

use crate::error::TransformError;

/// Sampling interval of a regular time grid, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cadence {
    seconds: i64,
}

impl Cadence {
    pub const HALF_HOURLY: Self = Self { seconds: 1_800 };
    pub const HOURLY: Self = Self { seconds: 3_600 };
    pub const DAILY: Self = Self { seconds: 86_400 };

    pub fn from_seconds(seconds: i64) -> Result<Self, TransformError> {
        if seconds <= 0 {
            return Err(TransformError::InvalidCadence(format!("{seconds}s")));
        }
        Ok(Self { seconds })
    }

    pub fn from_minutes(minutes: i64) -> Result<Self, TransformError> {
        Self::from_seconds(minutes.saturating_mul(60))
    }

    pub fn seconds(self) -> i64 {
        self.seconds
    }

    pub fn as_delta(self) -> TimeDelta {
        TimeDelta::seconds(self.seconds)
    }

    /// Start of the bucket containing `timestamp`.
    ///
    /// Buckets are aligned to the Unix epoch, so half-hourly buckets start at
    /// `:00` and `:30` and daily buckets at midnight.
    pub fn floor(self, timestamp: NaiveDateTime) -> NaiveDateTime {
        let truncated = timestamp - TimeDelta::nanoseconds(i64::from(timestamp.nanosecond()));
        let secs = truncated.and_utc().timestamp();
        truncated - TimeDelta::seconds(secs.rem_euclid(self.seconds))
    }

    /// Timestamp `steps` intervals after `origin`.
    pub(crate) fn offset(self, origin: NaiveDateTime, steps: usize) -> NaiveDateTime {
        let steps = i64::try_from(steps).unwrap_or(i64::MAX);
        origin + TimeDelta::seconds(self.seconds.saturating_mul(steps))
    }

    /// Whole steps between two timestamps, if `later - earlier` is a multiple
    /// of the cadence.
    pub(crate) fn steps_between(self, earlier: NaiveDateTime, later: NaiveDateTime) -> Option<i64> {
        let delta = (later - earlier).num_seconds();
        (delta.rem_euclid(self.seconds) == 0).then_some(delta.div_euclid(self.seconds))
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seconds % 86_400 == 0 {
            write!(f, "{}d", self.seconds / 86_400)
        } else if self.seconds % 3_600 == 0 {
            write!(f, "{}h", self.seconds / 3_600)
        } else if self.seconds % 60 == 0 {
            write!(f, "{}min", self.seconds / 60)
        } else {
            write!(f, "{}s", self.seconds)
        }
    }
}

impl FromStr for Cadence {
    type Err = TransformError;

    /// Parses `30min`, `1h`, `1d` or `90s`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim().to_ascii_lowercase();
        let split = trimmed
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit) = trimmed.split_at(split);
        let value: i64 = digits
            .parse()
            .map_err(|_| TransformError::InvalidCadence(raw.to_string()))?;
        let factor = match unit.trim() {
            "s" => 1,
            "min" | "m" | "t" => 60,
            "h" => 3_600,
            "d" => 86_400,
            _ => return Err(TransformError::InvalidCadence(raw.to_string())),
        };
        Self::from_seconds(value.saturating_mul(factor))
    }
}
