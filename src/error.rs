//! Error types for attendance counting
//!
//! Every variant is a structural validation failure detected before any
//! partial output is produced. Nothing here is retried.

use std::path::PathBuf;
use thiserror::Error;

use crate::time_point::TimePoint;

/// Errors raised while loading attendance records or building the table
#[derive(Error, Debug)]
pub enum OccupancyError {
    #[error("Malformed timestamp in {}, row {row}, column '{column}': {value:?} does not match '{format}'", file.display())]
    MalformedTimestamp {
        file: PathBuf,
        row: usize,
        column: String,
        value: String,
        format: String,
    },

    #[error("Source '{0}' has no attendance records")]
    EmptySource(String),

    #[error("No sources to merge")]
    NoSources,

    #[error("Duplicate source label '{0}'")]
    DuplicateLabel(String),

    #[error("Interval ends before it starts: {start} > {end}")]
    NegativeInterval { start: TimePoint, end: TimePoint },

    #[error("Time span {start} to {end} exceeds {limit} minutes")]
    SpanTooLong {
        start: TimePoint,
        end: TimePoint,
        limit: i64,
    },

    #[error("Column '{column}' not found in header of {}", file.display())]
    MissingColumn { file: PathBuf, column: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for attendance counting operations
pub type Result<T> = std::result::Result<T, OccupancyError>;
