//! Batch entry point: exports in, padded table out
//!
//! Sources are counted independently in parallel; merging waits for all of
//! them. Any failing source aborts the run, since a silently dropped source
//! would leave the `Total` column incomplete.

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;

use crate::aligner::{align_series, OrderedSeries};
use crate::config::{PipelineConfig, SourceSpec};
use crate::csv_output::CsvOutput;
use crate::discovery::discover_sources;
use crate::html_output::HtmlOutput;
use crate::ingest::{load_files, IngestOptions};
use crate::interval::extract_intervals;
use crate::json_output::JsonTable;
use crate::occupancy::{count_occupancy, Series};
use crate::padding::pad_to_hours;
use crate::table::CombinedTable;

/// Explicit sources from the config, or those discovered in `input_dir`
pub fn resolve_sources(config: &PipelineConfig) -> Result<Vec<SourceSpec>> {
    let sources = if config.sources.is_empty() {
        discover_sources(&config.input_dir, config.day, &config.day_marker)?
    } else {
        config.sources.clone()
    };

    if sources.is_empty() {
        bail!(
            "No attendance exports for day {} in {}",
            config.day,
            config.input_dir.display()
        );
    }

    for source in &sources {
        tracing::info!(
            "Source {} (order {}): {} file(s)",
            source.label,
            source.order_key,
            source.files.len()
        );
    }
    Ok(sources)
}

/// Load, round and count one source
pub fn count_source(config: &PipelineConfig, source: &SourceSpec, options: &IngestOptions) -> Result<Series> {
    let paths: Vec<PathBuf> = source
        .files
        .iter()
        .map(|f| config.resolve_input(f))
        .collect();

    let records = load_files(&paths, options)
        .with_context(|| format!("Failed to load source {}", source.label))?;
    let intervals = extract_intervals(&records)
        .with_context(|| format!("Invalid attendance record in source {}", source.label))?;
    let series = count_occupancy(&source.label, &intervals)?;

    tracing::debug!(
        "Source {}: {} intervals, {} to {}, peak {}",
        source.label,
        intervals.len(),
        series.start(),
        series.end(),
        series.peak()
    );
    Ok(series)
}

/// Run the whole transform for one configuration
///
/// Returns the hour-padded table; nothing is written.
pub fn run(config: &PipelineConfig) -> Result<CombinedTable> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let sources = resolve_sources(config)?;
    let options = config.ingest_options();

    let inputs = sources
        .par_iter()
        .map(|source| {
            count_source(config, source, &options)
                .map(|series| OrderedSeries::new(source.order_key, series))
        })
        .collect::<Result<Vec<_>>>()?;

    let table = align_series(inputs).context("Failed to merge sources")?;
    let padded = pad_to_hours(&table);

    tracing::info!(
        "Merged {} sources over {} minutes ({} to {})",
        padded.source_labels().len(),
        padded.len(),
        padded.start(),
        padded.end_exclusive()
    );
    Ok(padded)
}

/// Write every enabled output for `table`, returning the paths written
pub fn write_outputs(config: &PipelineConfig, table: &CombinedTable) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let mut written = Vec::new();

    if config.outputs.csv {
        let path = config.output_path("csv");
        CsvOutput::new(table)
            .write_to(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    if config.outputs.html {
        let path = config.output_path("html");
        let title = format!("Number of participants, day {}", config.day);
        fs::write(&path, HtmlOutput::new(table, title).to_html())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    if config.outputs.json {
        let path = config.output_path("json");
        let json = JsonTable::from_table(table).to_json()?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    for path in &written {
        tracing::info!("Wrote {}", path.display());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputTargets;
    use crate::error::OccupancyError;
    use std::path::Path;

    const HEADER: &str = "名前（元の名前）,参加時刻,退出時刻\n";

    fn write_export(dir: &Path, name: &str, rows: &[(&str, &str)]) {
        let mut data = HEADER.to_string();
        for (join, leave) in rows {
            data.push_str(&format!("someone,{join},{leave}\n"));
        }
        fs::write(dir.join(name), data).unwrap();
    }

    fn config_for(dir: &Path, day: u32) -> PipelineConfig {
        PipelineConfig {
            day,
            input_dir: dir.to_path_buf(),
            output_dir: dir.join("out"),
            ..Default::default()
        }
    }

    #[test]
    fn test_run_discovers_counts_and_pads() {
        let dir = tempfile::tempdir().unwrap();
        write_export(
            dir.path(),
            "Z2_3日目.csv",
            &[("2020/09/03 09:01:00 AM", "2020/09/03 09:03:00 AM")],
        );
        write_export(
            dir.path(),
            "Z1_3日目.csv",
            &[("2020/09/03 09:00:00 AM", "2020/09/03 09:02:00 AM")],
        );

        let table = run(&config_for(dir.path(), 3)).unwrap();

        assert_eq!(table.labels(), &["Total", "Z1", "Z2"]);
        assert_eq!(table.start(), "2020-09-03 09:00".parse().unwrap());
        assert_eq!(table.len(), 60);
        assert_eq!(&table.total()[..5], &[1, 2, 1, 0, 0]);
    }

    #[test]
    fn test_run_merges_am_pm_halves() {
        let dir = tempfile::tempdir().unwrap();
        write_export(
            dir.path(),
            "Z1_1日目_AM.csv",
            &[("2020/09/01 10:00:00 AM", "2020/09/01 11:00:00 AM")],
        );
        write_export(
            dir.path(),
            "Z1_1日目_PM.csv",
            &[("2020/09/01 01:00:00 PM", "2020/09/01 02:30:00 PM")],
        );

        let table = run(&config_for(dir.path(), 1)).unwrap();
        assert_eq!(table.source_labels(), &["Z1"]);
        assert_eq!(table.start(), "2020-09-01 10:00".parse().unwrap());
        assert_eq!(table.end_exclusive(), "2020-09-01 15:00".parse().unwrap());
        assert_eq!(table.value("Z1", "2020-09-01 13:30".parse().unwrap()), Some(1));
        assert_eq!(table.value("Z1", "2020-09-01 12:00".parse().unwrap()), Some(0));
    }

    #[test]
    fn test_run_fails_on_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        write_export(
            dir.path(),
            "Z1_2日目.csv",
            &[("2020/09/02 09:00:00 AM", "2020/09/02 09:30:00 AM")],
        );
        write_export(dir.path(), "Z2_2日目.csv", &[]);

        let err = run(&config_for(dir.path(), 2)).unwrap_err();
        let root = err.root_cause().downcast_ref::<OccupancyError>();
        assert!(matches!(root, Some(OccupancyError::EmptySource(label)) if label == "Z2"));
    }

    #[test]
    fn test_run_fails_on_mistyped_year() {
        let dir = tempfile::tempdir().unwrap();
        write_export(
            dir.path(),
            "Z1_3日目.csv",
            &[
                ("2020/09/03 09:00:00 AM", "2020/09/03 09:30:00 AM"),
                ("2020/09/03 09:00:00 AM", "9999/09/03 09:10:00 AM"),
            ],
        );

        let err = run(&config_for(dir.path(), 3)).unwrap_err();
        let root = err.root_cause().downcast_ref::<OccupancyError>();
        assert!(matches!(root, Some(OccupancyError::SpanTooLong { .. })));
    }

    #[test]
    fn test_run_with_custom_day_marker() {
        let dir = tempfile::tempdir().unwrap();
        write_export(
            dir.path(),
            "Z1_Day3.csv",
            &[("2020/09/03 09:00:00 AM", "2020/09/03 09:02:00 AM")],
        );
        write_export(
            dir.path(),
            "Z2_3日目.csv",
            &[("2020/09/03 09:00:00 AM", "2020/09/03 09:02:00 AM")],
        );

        let config = PipelineConfig {
            day_marker: "Day{day}".to_string(),
            ..config_for(dir.path(), 3)
        };
        let table = run(&config).unwrap();
        assert_eq!(table.source_labels(), &["Z1"]);
    }

    #[test]
    fn test_run_fails_without_exports() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&config_for(dir.path(), 5)).unwrap_err();
        assert!(err.to_string().contains("No attendance exports for day 5"));
    }

    #[test]
    fn test_run_uses_explicit_sources_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        write_export(
            dir.path(),
            "hall-a.csv",
            &[("2020/09/03 09:00:00 AM", "2020/09/03 09:10:00 AM")],
        );
        write_export(
            dir.path(),
            "hall-b.csv",
            &[("2020/09/03 09:00:00 AM", "2020/09/03 09:10:00 AM")],
        );

        let config = PipelineConfig {
            sources: vec![
                SourceSpec {
                    label: "A".to_string(),
                    order_key: 2,
                    files: vec![PathBuf::from("hall-a.csv")],
                },
                SourceSpec {
                    label: "B".to_string(),
                    order_key: 1,
                    files: vec![PathBuf::from("hall-b.csv")],
                },
            ],
            ..config_for(dir.path(), 3)
        };

        let table = run(&config).unwrap();
        assert_eq!(table.labels(), &["Total", "B", "A"]);
    }

    #[test]
    fn test_run_rejects_invalid_config() {
        let config = PipelineConfig {
            day: 0,
            ..Default::default()
        };
        assert!(run(&config).unwrap_err().to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        write_export(
            dir.path(),
            "Z1_3日目.csv",
            &[("2020/09/03 09:00:00 AM", "2020/09/03 09:02:00 AM")],
        );
        let config = PipelineConfig {
            outputs: OutputTargets {
                csv: true,
                html: true,
                json: true,
            },
            ..config_for(dir.path(), 3)
        };

        let table = run(&config).unwrap();
        let written = write_outputs(&config, &table).unwrap();

        assert_eq!(written.len(), 3);
        for path in &written {
            assert!(path.exists(), "{} missing", path.display());
        }
        let csv = fs::read_to_string(config.output_path("csv")).unwrap();
        assert!(csv.contains("2020-09-03 09:01:00,1,1"));
    }
}
