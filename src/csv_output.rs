//! CSV output for the per-minute table
//!
//! One row per minute, a header row of column labels, UTF-8 with a byte
//! order mark so spreadsheet tools pick up non-ASCII venue labels.

use std::fs;
use std::io;
use std::path::Path;

use crate::table::CombinedTable;
use crate::time_point::TimePoint;

const BOM: &str = "\u{feff}";

/// CSV formatter for a [`CombinedTable`]
#[derive(Debug)]
pub struct CsvOutput<'a> {
    table: &'a CombinedTable,
    include_bom: bool,
}

impl<'a> CsvOutput<'a> {
    /// Create a CSV formatter (with BOM)
    pub fn new(table: &'a CombinedTable) -> Self {
        Self {
            table,
            include_bom: true,
        }
    }

    /// Omit the byte order mark
    pub fn without_bom(mut self) -> Self {
        self.include_bom = false;
        self
    }

    /// Header row: empty time cell, then labels in column order
    fn header(&self) -> String {
        let mut fields = vec![String::new()];
        fields.extend(self.table.labels().iter().map(|l| Self::escape_field(l)));
        fields.join(",")
    }

    /// Escape CSV field (handle commas, quotes, line breaks)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_row(time: TimePoint, values: &[u32]) -> String {
        let mut row = time.to_string();
        for value in values {
            row.push(',');
            row.push_str(&value.to_string());
        }
        row
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        if self.include_bom {
            output.push_str(BOM);
        }

        output.push_str(&self.header());
        output.push('\n');

        for (time, values) in self.table.rows() {
            output.push_str(&Self::format_row(time, &values));
            output.push('\n');
        }

        output
    }

    /// Write the CSV document to `path`
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_csv())
    }
}
