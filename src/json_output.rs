//! JSON output format for the per-minute table

use serde::Serialize;

use crate::table::CombinedTable;
use crate::time_point::TimePoint;

/// One column of counts
#[derive(Debug, Clone, Serialize)]
pub struct JsonColumn<'a> {
    pub label: &'a str,
    pub counts: &'a [u32],
}

/// The whole table, columns in output order
#[derive(Debug, Clone, Serialize)]
pub struct JsonTable<'a> {
    /// First minute
    pub start: TimePoint,
    /// Number of minutes (rows)
    pub minutes: usize,
    pub columns: Vec<JsonColumn<'a>>,
}

impl<'a> JsonTable<'a> {
    pub fn from_table(table: &'a CombinedTable) -> Self {
        let columns = table
            .labels()
            .iter()
            .map(|label| JsonColumn {
                label,
                counts: table.column(label).unwrap_or_default(),
            })
            .collect();
        Self {
            start: table.start(),
            minutes: table.len(),
            columns,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
