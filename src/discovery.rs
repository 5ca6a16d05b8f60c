//! Input file discovery by naming convention
//!
//! Exports are named `<label>_<day>日目[_AM|_PM].csv`, e.g. `Z3_2日目_AM.csv`.
//! The day marker is a template; `{day}` is replaced by the day number.
//! Morning and afternoon halves of the same session are paired into one
//! source. The default column ordering key is the venue number after the
//! last `Z` in the label.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::SourceSpec;

/// Day marker used by Zoom exports of a multi-day event
pub const DEFAULT_DAY_MARKER: &str = "{day}日目";

/// Placeholder substituted in a day marker template
pub const DAY_PLACEHOLDER: &str = "{day}";

/// Ordering key for labels without a venue number; sorts them last
pub const UNNUMBERED_ORDER_KEY: i64 = i64::MAX;

const AM_SUFFIX: &str = "_AM";
const PM_SUFFIX: &str = "_PM";

fn venue_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Z(\d+)$").expect("valid venue pattern"))
}

/// Label of an export file: the name up to the first `_`
pub fn label_for(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".csv").unwrap_or(file_name);
    stem.split('_').next().unwrap_or(stem).to_string()
}

/// Venue number after the last `Z` of a label (`Z12` -> 12)
pub fn order_key_for(label: &str) -> i64 {
    venue_number()
        .captures(label)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(UNNUMBERED_ORDER_KEY)
}

/// Whether a file name belongs to `day` under a marker template
///
/// The rendered marker must not touch another digit, so `3日目` matches day
/// 3 but not day 13, and `Day1` does not match `Day12`.
pub fn matches_day(file_name: &str, day: u32, marker: &str) -> bool {
    let marker = marker.replace(DAY_PLACEHOLDER, &day.to_string());
    file_name.match_indices(&marker).any(|(idx, m)| {
        let before = file_name[..idx].chars().next_back();
        let after = file_name[idx + m.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_digit()) && !after.is_some_and(|c| c.is_ascii_digit())
    })
}

/// Group file names of one day into sources
///
/// `_AM`/`_PM` halves sharing a prefix become one source with both files
/// (morning first). A plain file named like a paired prefix is ignored in
/// favour of the pair. Result is sorted by ordering key, then label.
pub fn group_sources(file_names: &[String], day: u32, marker: &str) -> Vec<SourceSpec> {
    let mut plain: BTreeMap<String, String> = BTreeMap::new();
    let mut am: BTreeMap<String, String> = BTreeMap::new();
    let mut pm: BTreeMap<String, String> = BTreeMap::new();

    for name in file_names {
        if !name.ends_with(".csv") || !matches_day(name, day, marker) {
            continue;
        }
        let stem = &name[..name.len() - ".csv".len()];
        if let Some(prefix) = stem.strip_suffix(AM_SUFFIX) {
            am.insert(prefix.to_string(), name.clone());
        } else if let Some(prefix) = stem.strip_suffix(PM_SUFFIX) {
            pm.insert(prefix.to_string(), name.clone());
        } else {
            plain.insert(stem.to_string(), name.clone());
        }
    }

    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for (prefix, am_name) in am {
        match pm.remove(&prefix) {
            Some(pm_name) => {
                if plain.remove(&prefix).is_some() {
                    tracing::debug!("Ignoring {prefix}.csv in favour of its AM/PM halves");
                }
                groups.push((format!("{prefix}.csv"), vec![am_name, pm_name]));
            }
            None => groups.push((am_name.clone(), vec![am_name])),
        }
    }
    groups.extend(pm.into_values().map(|name| (name.clone(), vec![name])));
    groups.extend(plain.into_values().map(|name| (name.clone(), vec![name])));

    let mut sources: Vec<SourceSpec> = groups
        .into_iter()
        .map(|(name, files)| {
            let label = label_for(&name);
            SourceSpec {
                order_key: order_key_for(&label),
                label,
                files: files.into_iter().map(PathBuf::from).collect(),
            }
        })
        .collect();
    sources.sort_by(|a, b| {
        a.order_key
            .cmp(&b.order_key)
            .then_with(|| a.label.cmp(&b.label))
    });
    sources
}

/// Scan `input_dir` for the exports of `day`
///
/// Returned file paths are relative to `input_dir`.
pub fn discover_sources(input_dir: &Path, day: u32, marker: &str) -> Result<Vec<SourceSpec>> {
    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("Failed to read input directory {}", input_dir.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", input_dir.display()))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => tracing::warn!("Skipping non UTF-8 file name {:?}", name),
        }
    }

    let sources = group_sources(&names, day, marker);
    tracing::info!(
        "Discovered {} sources for day {} in {}",
        sources.len(),
        day,
        input_dir.display()
    );
    Ok(sources)
}
