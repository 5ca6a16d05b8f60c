//! Pipeline configuration
//!
//! Everything one run needs is held in a [`PipelineConfig`] value: the day to
//! process, where the exports live, how to read them, which sources to
//! merge in which order, and which files to write. Loaded from TOML; CLI
//! flags override individual fields.
//!
//! ```toml
//! day = 3
//! day_marker = "{day}日目"
//! input_dir = "input"
//! output_dir = "output"
//!
//! [outputs]
//! csv = true
//! html = true
//! json = false
//!
//! [[sources]]
//! label = "Z1"
//! order_key = 1
//! files = ["Z1_3日目_AM.csv", "Z1_3日目_PM.csv"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::discovery::{DAY_PLACEHOLDER, DEFAULT_DAY_MARKER};
use crate::ingest::{IngestOptions, DEFAULT_JOIN_COLUMN, DEFAULT_LEAVE_COLUMN, DEFAULT_TIMESTAMP_FORMAT};
use crate::table::TOTAL_LABEL;

/// One attendance source (venue/session) and the exports that make it up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Column label in the output
    pub label: String,

    /// Column ordering key, ascending; equal keys keep list order
    #[serde(default)]
    pub order_key: i64,

    /// Export files, relative to `input_dir` unless absolute
    pub files: Vec<PathBuf>,
}

/// Which output files to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputTargets {
    /// Per-minute table (UTF-8 with BOM)
    pub csv: bool,
    /// Line chart page
    pub html: bool,
    /// Table as JSON
    pub json: bool,
}

impl Default for OutputTargets {
    fn default() -> Self {
        Self {
            csv: true,
            html: true,
            json: false,
        }
    }
}

impl OutputTargets {
    pub fn any(&self) -> bool {
        self.csv || self.html || self.json
    }
}

/// Configuration for one batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Event day selecting exports during discovery
    pub day: u32,

    /// File name marker of a day's exports; `{day}` is the day number
    pub day_marker: String,

    pub input_dir: PathBuf,

    pub output_dir: PathBuf,

    /// Header of the join-time column
    pub join_column: String,

    /// Header of the leave-time column
    pub leave_column: String,

    /// chrono format string for both timestamp columns
    pub timestamp_format: String,

    /// Explicit sources; when empty, sources are discovered in `input_dir`
    pub sources: Vec<SourceSpec>,

    pub outputs: OutputTargets,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            day: 1,
            day_marker: DEFAULT_DAY_MARKER.to_string(),
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            join_column: DEFAULT_JOIN_COLUMN.to_string(),
            leave_column: DEFAULT_LEAVE_COLUMN.to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            sources: Vec::new(),
            outputs: OutputTargets::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Load configuration from a TOML string; missing fields take defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.day == 0 {
            return Err("day must be >= 1".to_string());
        }

        if !self.day_marker.contains(DAY_PLACEHOLDER) {
            return Err(format!("day_marker must contain {DAY_PLACEHOLDER}"));
        }

        for (name, value) in [
            ("join_column", &self.join_column),
            ("leave_column", &self.leave_column),
            ("timestamp_format", &self.timestamp_format),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{name} must not be empty"));
            }
        }

        let mut labels = HashSet::new();
        for source in &self.sources {
            if source.label.is_empty() {
                return Err("source label must not be empty".to_string());
            }
            if source.label == TOTAL_LABEL {
                return Err(format!("source label '{TOTAL_LABEL}' is reserved"));
            }
            if !labels.insert(source.label.as_str()) {
                return Err(format!("duplicate source label '{}'", source.label));
            }
            if source.files.is_empty() {
                return Err(format!("source '{}' lists no files", source.label));
            }
        }

        if !self.outputs.any() {
            return Err("at least one output (csv, html, json) must be enabled".to_string());
        }

        Ok(())
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            join_column: self.join_column.clone(),
            leave_column: self.leave_column.clone(),
            timestamp_format: self.timestamp_format.clone(),
        }
    }

    /// Export path resolved against `input_dir`
    pub fn resolve_input(&self, file: &Path) -> PathBuf {
        self.input_dir.join(file)
    }

    /// Output path for an extension, e.g. `output/n_participants_day3.csv`
    pub fn output_path(&self, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("n_participants_day{}.{}", self.day, extension))
    }
}
