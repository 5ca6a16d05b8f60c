//! Per-minute concurrency counting
//!
//! Uses a difference array: each interval contributes +1 at its start offset
//! and -1 at its end offset, and one prefix-sum pass turns the deltas into
//! the number of participants present at every minute. This is
//! O(intervals + minutes) instead of testing every interval at every minute.

use crate::error::{OccupancyError, Result};
use crate::interval::Interval;
use crate::time_point::TimePoint;

/// Concurrency counts for one source, one entry per minute
///
/// Covers every minute from the earliest start to the latest end inclusive.
/// The final entry is always 0 since every interval ending there has left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    label: String,
    start: TimePoint,
    counts: Vec<u32>,
}

impl Series {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// First minute covered
    pub fn start(&self) -> TimePoint {
        self.start
    }

    /// Last minute covered (inclusive)
    pub fn end(&self) -> TimePoint {
        self.start.plus_minutes(self.counts.len() as i64 - 1)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Count at `t`, or 0 outside the covered range
    pub fn count_at(&self, t: TimePoint) -> u32 {
        usize::try_from(t.minutes_since(self.start))
            .ok()
            .and_then(|offset| self.counts.get(offset))
            .copied()
            .unwrap_or(0)
    }

    /// Highest concurrency observed
    pub fn peak(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimePoint, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(offset, &count)| (self.start.plus_minutes(offset as i64), count))
    }
}

/// Longest span a series or table may cover: one day
///
/// Exports cover a single event day. A longer span means a corrupted but
/// parseable timestamp (a mistyped year, say) and is rejected before any
/// per-minute buffer is allocated.
pub const MAX_SPAN_MINUTES: i64 = 24 * 60;

/// Number of minutes in `start..=end`, bounded by [`MAX_SPAN_MINUTES`]
pub fn span_len(start: TimePoint, end: TimePoint) -> Result<usize> {
    let span = end.minutes_since(start);
    if span > MAX_SPAN_MINUTES {
        return Err(OccupancyError::SpanTooLong {
            start,
            end,
            limit: MAX_SPAN_MINUTES,
        });
    }
    Ok(span as usize + 1)
}

/// Boundary deltas for a set of intervals
///
/// Returns the anchor minute (earliest start) and one delta per minute up to
/// and including the latest end, or `None` when there are no intervals.
///
/// # Errors
/// `SpanTooLong` when the intervals cover more than [`MAX_SPAN_MINUTES`].
pub fn boundary_deltas(intervals: &[Interval]) -> Result<Option<(TimePoint, Vec<i64>)>> {
    let (Some(t_min), Some(t_max)) = (
        intervals.iter().map(Interval::start).min(),
        intervals.iter().map(Interval::end).max(),
    ) else {
        return Ok(None);
    };

    let mut deltas = vec![0i64; span_len(t_min, t_max)?];
    for interval in intervals {
        deltas[interval.start().minutes_since(t_min) as usize] += 1;
        deltas[interval.end().minutes_since(t_min) as usize] -= 1;
    }

    Ok(Some((t_min, deltas)))
}

/// Count concurrent participants at every minute of one source
///
/// The count at minute `t` equals the number of intervals with
/// `start <= t < end`. Interval order does not matter.
///
/// # Errors
/// * `EmptySource` when `intervals` is empty: there is no range to anchor
/// * `SpanTooLong` when the source covers more than a day
///
/// # Example
/// ```
/// use headcount::interval::Interval;
/// use headcount::occupancy::count_occupancy;
/// use headcount::time_point::TimePoint;
///
/// let t: TimePoint = "2020-09-03 09:00".parse().unwrap();
/// let intervals = vec![Interval::new(t, t.plus_minutes(5)).unwrap()];
///
/// let series = count_occupancy("Z1", &intervals).unwrap();
/// assert_eq!(series.count_at(t.plus_minutes(4)), 1);
/// assert_eq!(series.count_at(t.plus_minutes(5)), 0);
/// ```
pub fn count_occupancy(label: &str, intervals: &[Interval]) -> Result<Series> {
    let (start, deltas) =
        boundary_deltas(intervals)?.ok_or_else(|| OccupancyError::EmptySource(label.to_string()))?;

    // Never negative: every -1 sits at or after its matching +1
    let mut present = 0i64;
    let counts = deltas
        .iter()
        .map(|delta| {
            present += delta;
            present as u32
        })
        .collect();

    Ok(Series {
        label: label.to_string(),
        start,
        counts,
    })
}
