//! Raw join/leave records rounded to minute intervals
//!
//! Join times are floored and leave times ceiled, so a participant present
//! for any fraction of a minute counts as present for that whole minute.

use chrono::NaiveDateTime;

use crate::error::{OccupancyError, Result};
use crate::time_point::TimePoint;

/// One attendance record at second-level precision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord {
    pub join: NaiveDateTime,
    pub leave: NaiveDateTime,
}

/// Half-open presence interval `[start, end)` at minute resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    start: TimePoint,
    end: TimePoint,
}

impl Interval {
    /// Create an interval, rejecting `end < start`
    ///
    /// `end == start` is a zero-duration presence and is accepted.
    pub fn new(start: TimePoint, end: TimePoint) -> Result<Self> {
        if end < start {
            return Err(OccupancyError::NegativeInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Round a raw record to an interval
    pub fn from_raw(record: &RawRecord) -> Result<Self> {
        Self::new(TimePoint::floor(record.join), TimePoint::ceil(record.leave))
    }

    pub fn start(&self) -> TimePoint {
        self.start
    }

    pub fn end(&self) -> TimePoint {
        self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        self.end.minutes_since(self.start)
    }

    /// Whether a participant is counted as present at minute `t`
    pub fn covers(&self, t: TimePoint) -> bool {
        self.start <= t && t < self.end
    }
}

/// Round every record of one source, failing on the first inverted record
pub fn extract_intervals(records: &[RawRecord]) -> Result<Vec<Interval>> {
    records.iter().map(Interval::from_raw).collect()
}
