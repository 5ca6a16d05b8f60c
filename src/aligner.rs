//! Merge per-source series onto one time axis
//!
//! Each source only covers the minutes between its own first join and last
//! leave. Outside that window the source had nobody present, so its column
//! is zero-filled rather than treated as missing.

use std::collections::{HashMap, HashSet};

use crate::error::{OccupancyError, Result};
use crate::occupancy::{span_len, Series};
use crate::table::{CombinedTable, TOTAL_LABEL};

/// A series with the caller-assigned column ordering key
#[derive(Debug, Clone)]
pub struct OrderedSeries {
    pub order_key: i64,
    pub series: Series,
}

impl OrderedSeries {
    pub fn new(order_key: i64, series: Series) -> Self {
        Self { order_key, series }
    }
}

/// Align series on the union of their ranges and add a `Total` column
///
/// Source columns are ordered by `order_key` (ties keep input order) and
/// `Total` is always the first column. Labels are validated before anything
/// is merged.
///
/// # Errors
/// * `NoSources` if `inputs` is empty
/// * `DuplicateLabel` if two series share a label, or a series is named `Total`
/// * `SpanTooLong` if the union of the ranges covers more than a day
pub fn align_series(mut inputs: Vec<OrderedSeries>) -> Result<CombinedTable> {
    check_labels(&inputs)?;

    let start = inputs
        .iter()
        .map(|i| i.series.start())
        .min()
        .ok_or(OccupancyError::NoSources)?;
    let end = inputs
        .iter()
        .map(|i| i.series.end())
        .max()
        .ok_or(OccupancyError::NoSources)?;
    let len = span_len(start, end)?;

    inputs.sort_by_key(|i| i.order_key);

    let mut labels = Vec::with_capacity(inputs.len() + 1);
    labels.push(TOTAL_LABEL.to_string());
    let mut columns = HashMap::with_capacity(inputs.len() + 1);
    let mut total = vec![0u32; len];

    for OrderedSeries { series, .. } in inputs {
        let offset = series.start().minutes_since(start) as usize;
        let mut column = vec![0u32; len];
        column[offset..offset + series.len()].copy_from_slice(series.counts());

        for (sum, value) in total.iter_mut().zip(&column) {
            *sum += value;
        }

        labels.push(series.label().to_string());
        columns.insert(series.label().to_string(), column);
    }
    columns.insert(TOTAL_LABEL.to_string(), total);

    Ok(CombinedTable::from_columns(start, len, labels, columns))
}

fn check_labels(inputs: &[OrderedSeries]) -> Result<()> {
    let mut seen = HashSet::with_capacity(inputs.len() + 1);
    seen.insert(TOTAL_LABEL);
    for input in inputs {
        if !seen.insert(input.series.label()) {
            return Err(OccupancyError::DuplicateLabel(
                input.series.label().to_string(),
            ));
        }
    }
    Ok(())
}
