//! Attendance export loading
//!
//! Reads participant CSV exports (one row per join/leave pair) into
//! [`RawRecord`]s. Column names and the timestamp format are configurable;
//! the defaults match the Japanese-locale Zoom participant report.

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{OccupancyError, Result};
use crate::interval::RawRecord;

/// Default join-time header (Zoom, ja-JP)
pub const DEFAULT_JOIN_COLUMN: &str = "参加時刻";
/// Default leave-time header (Zoom, ja-JP)
pub const DEFAULT_LEAVE_COLUMN: &str = "退出時刻";
/// Zoom's 12-hour timestamp format, e.g. `2020/09/03 09:41:07 AM`
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %I:%M:%S %p";

const BOM: char = '\u{feff}';

/// How to locate and parse the timestamp columns of an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    pub join_column: String,
    pub leave_column: String,
    pub timestamp_format: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            join_column: DEFAULT_JOIN_COLUMN.to_string(),
            leave_column: DEFAULT_LEAVE_COLUMN.to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

/// Read every record from CSV data
///
/// `origin` only labels errors. The header row is required.
pub fn read_records<R: Read>(reader: R, origin: &Path, options: &IngestOptions) -> Result<Vec<RawRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let join_idx = column_index(&headers, &options.join_column, origin)?;
    let leave_idx = column_index(&headers, &options.leave_column, origin)?;

    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        // Header is line 1
        let line = row.position().map_or(i + 2, |p| p.line() as usize);
        let field = |idx: usize, column: &str| -> Result<NaiveDateTime> {
            let value = row.get(idx).unwrap_or_default();
            parse_timestamp(value, &options.timestamp_format).ok_or_else(|| {
                OccupancyError::MalformedTimestamp {
                    file: origin.to_path_buf(),
                    row: line,
                    column: column.to_string(),
                    value: value.to_string(),
                    format: options.timestamp_format.clone(),
                }
            })
        };

        records.push(RawRecord {
            join: field(join_idx, &options.join_column)?,
            leave: field(leave_idx, &options.leave_column)?,
        });
    }

    Ok(records)
}

/// Read every record from one export file
pub fn load_file(path: &Path, options: &IngestOptions) -> Result<Vec<RawRecord>> {
    let file = File::open(path)?;
    let records = read_records(file, path, options)?;
    tracing::debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Concatenate the records of several files belonging to one source
///
/// Used for sessions exported as separate morning/afternoon halves.
pub fn load_files(paths: &[PathBuf], options: &IngestOptions) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    for path in paths {
        records.extend(load_file(path, options)?);
    }
    Ok(records)
}

fn column_index(headers: &StringRecord, column: &str, origin: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches(BOM).trim() == column)
        .ok_or_else(|| OccupancyError::MissingColumn {
            file: origin.to_path_buf(),
            column: column.to_string(),
        })
}

fn parse_timestamp(value: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), format).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_point::TIMESTAMP_FORMAT;

    fn raw(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn read(data: &str) -> Result<Vec<RawRecord>> {
        read_records(data.as_bytes(), Path::new("test.csv"), &IngestOptions::default())
    }

    #[test]
    fn test_reads_zoom_export() {
        let data = "名前（元の名前）,ユーザーのメール,参加時刻,退出時刻,期間（分）\n\
                    山田,yamada@example.com,2020/09/03 09:00:42 AM,2020/09/03 01:04:05 PM,244\n\
                    \"Smith, J\",smith@example.com,2020/09/03 12:30:00 PM,2020/09/03 12:45:10 PM,16\n";
        let records = read(data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].join, raw("2020-09-03 09:00:42"));
        assert_eq!(records[0].leave, raw("2020-09-03 13:04:05"));
        assert_eq!(records[1].join, raw("2020-09-03 12:30:00"));
    }

    #[test]
    fn test_bom_on_header_tolerated() {
        let data = "\u{feff}参加時刻,退出時刻\n2020/09/03 09:00:00 AM,2020/09/03 09:10:00 AM\n";
        assert_eq!(read(data).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_column() {
        let data = "join,leave\n2020/09/03 09:00:00 AM,2020/09/03 09:10:00 AM\n";
        let err = read(data).unwrap_err();
        assert!(matches!(err, OccupancyError::MissingColumn { column, .. } if column == "参加時刻"));
    }

    #[test]
    fn test_malformed_timestamp_reports_line() {
        let data = "参加時刻,退出時刻\n\
                    2020/09/03 09:00:00 AM,2020/09/03 09:10:00 AM\n\
                    2020-09-03 09:00,2020/09/03 09:10:00 AM\n";
        let err = read(data).unwrap_err();
        match err {
            OccupancyError::MalformedTimestamp { row, column, value, .. } => {
                assert_eq!(row, 3);
                assert_eq!(column, "参加時刻");
                assert_eq!(value, "2020-09-03 09:00");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_columns_and_format() {
        let options = IngestOptions {
            join_column: "Join Time".to_string(),
            leave_column: "Leave Time".to_string(),
            timestamp_format: "%m/%d/%Y %H:%M:%S".to_string(),
        };
        let data = "Name,Join Time,Leave Time\nA,09/03/2020 14:00:00,09/03/2020 14:30:00\n";
        let records = read_records(data.as_bytes(), Path::new("en.csv"), &options).unwrap();
        assert_eq!(records[0].join, raw("2020-09-03 14:00:00"));
    }

    #[test]
    fn test_header_only_yields_no_records() {
        assert!(read("参加時刻,退出時刻\n").unwrap().is_empty());
    }

    #[test]
    fn test_load_files_concatenates_halves() {
        let dir = tempfile::tempdir().unwrap();
        let am = dir.path().join("Z1_3日目_AM.csv");
        let pm = dir.path().join("Z1_3日目_PM.csv");
        std::fs::write(&am, "参加時刻,退出時刻\n2020/09/03 09:00:00 AM,2020/09/03 11:00:00 AM\n").unwrap();
        std::fs::write(&pm, "参加時刻,退出時刻\n2020/09/03 01:00:00 PM,2020/09/03 03:00:00 PM\n").unwrap();

        let records = load_files(&[am, pm], &IngestOptions::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].join, raw("2020-09-03 13:00:00"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_file(Path::new("/nonexistent/zoom.csv"), &IngestOptions::default()).unwrap_err();
        assert!(matches!(err, OccupancyError::Io(_)));
    }
}
