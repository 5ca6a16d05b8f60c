//! CLI argument parsing for headcount

use clap::Parser;
use std::path::PathBuf;

use crate::config::PipelineConfig;

#[derive(Parser, Debug)]
#[command(name = "headcount")]
#[command(version)]
#[command(about = "Per-minute concurrent attendance from join/leave exports", long_about = None)]
pub struct Cli {
    /// TOML configuration file (sources, columns, outputs)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Event day; selects exports named like `Z1_<DAY>日目.csv`
    #[arg(short = 'd', long = "day", value_name = "DAY")]
    pub day: Option<u32>,

    /// Directory holding the attendance exports
    #[arg(short = 'i', long = "input", value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory for the generated table and chart
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip the HTML chart
    #[arg(long = "no-chart")]
    pub no_chart: bool,

    /// Also write the table as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Enable debug tracing output (to stderr)
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(day) = self.day {
            config.day = day;
        }
        if let Some(dir) = &self.input_dir {
            config.input_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.no_chart {
            config.outputs.html = false;
        }
        if self.json {
            config.outputs.json = true;
        }
        config
    }
}
