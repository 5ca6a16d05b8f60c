//! Extend a table's time axis to whole hours
//!
//! Consumers plot and tabulate against an hour-aligned axis whatever the
//! first and last observed activity was.

use std::collections::HashMap;

use crate::table::CombinedTable;

/// Pad a table with zero rows out to the surrounding hour boundaries
///
/// The result spans `[floor_hour(start), ceil_hour(end + 1 minute))`: it
/// starts at the hour containing the first row and ends on the hour boundary
/// after the last row. Original rows are copied unchanged and every
/// synthesized row is zero in all columns, `Total` included. A table already
/// aligned on both ends is returned as an identical copy.
pub fn pad_to_hours(table: &CombinedTable) -> CombinedTable {
    let padded_start = table.start().floor_hour();
    let padded_end = table.end_exclusive().ceil_hour();

    let leading = table.start().minutes_since(padded_start) as usize;
    let len = padded_end.minutes_since(padded_start) as usize;

    let columns: HashMap<String, Vec<u32>> = table
        .labels()
        .iter()
        .map(|label| {
            let mut padded = vec![0u32; len];
            if let Some(column) = table.column(label) {
                padded[leading..leading + column.len()].copy_from_slice(column);
            }
            (label.clone(), padded)
        })
        .collect();

    CombinedTable::from_columns(padded_start, len, table.labels().to_vec(), columns)
}
