//! Minute-indexed table of per-source counts with a synthesized total

use std::collections::HashMap;

use crate::time_point::TimePoint;

/// Label of the synthesized column summing every source
pub const TOTAL_LABEL: &str = "Total";

/// Counts per minute for every source plus a `Total` column
///
/// The time axis is contiguous at one-minute steps starting at `start`.
/// `labels` holds the column order and always begins with `Total`; `columns`
/// maps each label to exactly `len` counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedTable {
    start: TimePoint,
    len: usize,
    labels: Vec<String>,
    columns: HashMap<String, Vec<u32>>,
}

impl CombinedTable {
    /// Assemble a table from columns already laid out on a common axis
    pub(crate) fn from_columns(
        start: TimePoint,
        len: usize,
        labels: Vec<String>,
        columns: HashMap<String, Vec<u32>>,
    ) -> Self {
        debug_assert!(labels.first().map(String::as_str) == Some(TOTAL_LABEL));
        debug_assert!(columns.values().all(|c| c.len() == len));
        Self {
            start,
            len,
            labels,
            columns,
        }
    }

    /// First row
    pub fn start(&self) -> TimePoint {
        self.start
    }

    /// Last row (inclusive)
    pub fn end(&self) -> TimePoint {
        self.start.plus_minutes(self.len as i64 - 1)
    }

    /// Minute right after the last row
    pub fn end_exclusive(&self) -> TimePoint {
        self.start.plus_minutes(self.len as i64)
    }

    /// Number of rows (minutes)
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Column labels in output order, `Total` first
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Source labels in output order, without `Total`
    pub fn source_labels(&self) -> &[String] {
        &self.labels[1..]
    }

    pub fn column(&self, label: &str) -> Option<&[u32]> {
        self.columns.get(label).map(Vec::as_slice)
    }

    pub fn total(&self) -> &[u32] {
        self.column(TOTAL_LABEL).unwrap_or_default()
    }

    /// Cell value, `None` for an unknown label or a minute outside the axis
    pub fn value(&self, label: &str, t: TimePoint) -> Option<u32> {
        let offset = usize::try_from(t.minutes_since(self.start)).ok()?;
        self.column(label)?.get(offset).copied()
    }

    /// Highest total and the first minute it occurs
    pub fn peak_total(&self) -> Option<(TimePoint, u32)> {
        let total = self.total();
        let peak = total.iter().copied().max()?;
        let offset = total.iter().position(|&v| v == peak)?;
        Some((self.start.plus_minutes(offset as i64), peak))
    }

    pub fn times(&self) -> impl Iterator<Item = TimePoint> + '_ {
        (0..self.len).map(|offset| self.start.plus_minutes(offset as i64))
    }

    /// Rows as `(minute, values in label order)`
    pub fn rows(&self) -> impl Iterator<Item = (TimePoint, Vec<u32>)> + '_ {
        let ordered: Vec<&[u32]> = self
            .labels
            .iter()
            .map(|label| self.column(label).unwrap_or_default())
            .collect();
        self.times().enumerate().map(move |(offset, t)| {
            let values = ordered
                .iter()
                .map(|column| column.get(offset).copied().unwrap_or(0))
                .collect();
            (t, values)
        })
    }
}
