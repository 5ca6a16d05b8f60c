//! Minute-resolution timestamps
//!
//! A `TimePoint` counts whole minutes since the Unix epoch on a naive
//! (timezone-free) clock. Attendance exports carry local wall-clock times for
//! a single day, so no timezone conversion is ever applied.

use chrono::{DateTime, NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const SECONDS_PER_MINUTE: i64 = 60;
const MINUTES_PER_HOUR: i64 = 60;

/// Display format shared by the CSV and JSON writers
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A discrete timestamp at one-minute granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePoint(i64);

impl TimePoint {
    /// Build from minutes since the epoch
    pub const fn from_minutes(minutes: i64) -> Self {
        Self(minutes)
    }

    /// Minutes since the epoch
    pub const fn minutes(self) -> i64 {
        self.0
    }

    /// Round a raw timestamp down to the containing minute
    pub fn floor(raw: NaiveDateTime) -> Self {
        let secs = raw.and_utc().timestamp();
        Self(secs.div_euclid(SECONDS_PER_MINUTE))
    }

    /// Round a raw timestamp up to the next minute boundary
    ///
    /// A timestamp already on a boundary is unchanged.
    pub fn ceil(raw: NaiveDateTime) -> Self {
        let floored = Self::floor(raw);
        if raw.second() == 0 && raw.nanosecond() == 0 {
            floored
        } else {
            floored.plus_minutes(1)
        }
    }

    pub const fn plus_minutes(self, minutes: i64) -> Self {
        Self(self.0 + minutes)
    }

    /// Signed distance in minutes from `earlier` to `self`
    pub const fn minutes_since(self, earlier: Self) -> i64 {
        self.0 - earlier.0
    }

    /// Start of the hour containing this minute
    pub const fn floor_hour(self) -> Self {
        Self(self.0 - self.0.rem_euclid(MINUTES_PER_HOUR))
    }

    /// Smallest hour boundary at or after this minute
    pub const fn ceil_hour(self) -> Self {
        if self.is_hour_aligned() {
            self
        } else {
            Self(self.floor_hour().0 + MINUTES_PER_HOUR)
        }
    }

    pub const fn is_hour_aligned(self) -> bool {
        self.0.rem_euclid(MINUTES_PER_HOUR) == 0
    }

    /// Wall-clock representation, `None` if outside chrono's range
    pub fn to_naive(self) -> Option<NaiveDateTime> {
        self.0
            .checked_mul(SECONDS_PER_MINUTE)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc())
    }

    /// `HH:MM` label used on chart axes
    pub fn hour_minute(self) -> String {
        match self.to_naive() {
            Some(dt) => dt.format("%H:%M").to_string(),
            None => format!("+{}m", self.0),
        }
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_naive() {
            Some(dt) => write!(f, "{}", dt.format(TIMESTAMP_FORMAT)),
            None => write!(f, "minute {}", self.0),
        }
    }
}

/// Parses `YYYY-MM-DD HH:MM` or `YYYY-MM-DD HH:MM:SS`, flooring seconds
impl FromStr for TimePoint {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
            .map(Self::floor)
    }
}

impl Serialize for TimePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
