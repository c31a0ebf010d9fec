// src/history.rs
//! Time-series aggregation across historical snapshots.
//!
//! Each snapshot folder holds the per-key aggregates for one committed state
//! of the data. This pass pivots them into one tree per metric key, mapping
//! snapshot identifier (or its calendar date) to that snapshot's value.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{Result, StatsError};
use crate::value::{read_value, write_json, Value};

/// Catalog-style keys (listings, free text) that are meaningless to carry
/// across snapshots; they are always excluded from time-series merging.
pub const HISTORY_EXCLUDED_KEYS: &[&str] = &[
    "codelist_values",
    "duplicate_identifiers",
    "publisher_duplicate_identifiers",
    "participating_orgs_text",
    "transaction_dates",
];

#[derive(Debug, Clone)]
pub struct HistoryOptions {
    /// Root of the snapshot layout: `<gitout>/commits/<id>/aggregated/*.json`.
    pub gitout: PathBuf,
    /// Key time-series points by calendar date instead of snapshot id.
    pub dated: bool,
    /// JSON mapping from snapshot id to ISO date, used in dated mode.
    pub dates_file: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct HistorySummary {
    pub keys: usize,
    pub snapshots_added: usize,
    pub snapshots_skipped: usize,
}

/// Builds (or extends) the time-series trees under
/// `<gitout>/gitaggregate[-dated]/<key>.json`.
///
/// Existing outputs are loaded first and a snapshot already present is never
/// re-added: re-running overwrites files, it does not double-add totals.
pub fn gitaggregate(opts: &HistoryOptions) -> Result<HistorySummary> {
    let out_dir = opts.gitout.join(if opts.dated {
        "gitaggregate-dated"
    } else {
        "gitaggregate"
    });

    let dates = if opts.dated {
        load_dates(&opts.dates_file)?
    } else {
        BTreeMap::new()
    };

    let mut total: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
    load_existing(&out_dir, &mut total)?;

    let mut summary = HistorySummary::default();
    let commits_dir = opts.gitout.join("commits");
    for commit in sorted_dir_names(&commits_dir)? {
        let label = if opts.dated {
            match dates.get(&commit) {
                Some(date) => date.clone(),
                // Snapshots absent from the date mapping are skipped.
                None => {
                    summary.snapshots_skipped += 1;
                    continue;
                }
            }
        } else {
            commit.clone()
        };

        let aggregated = commits_dir.join(&commit).join("aggregated");
        let mut added = false;
        for key in json_keys(&aggregated)? {
            if HISTORY_EXCLUDED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let series = total.entry(key.clone()).or_default();
            if series.contains_key(&label) {
                continue;
            }
            let value = read_value(&aggregated.join(format!("{key}.json")))?;
            let _ = series.insert(label.clone(), value);
            added = true;
        }
        if added {
            summary.snapshots_added += 1;
        }
    }

    summary.keys = total.len();
    for (key, series) in &total {
        let tree = Value::Tree(series.clone());
        write_json(&out_dir.join(format!("{key}.json")), &tree)?;
    }
    Ok(summary)
}

fn load_dates(path: &Path) -> Result<BTreeMap<String, String>> {
    let file = File::open(path).map_err(|e| StatsError::from(e).with_path(path))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn load_existing(
    out_dir: &Path,
    total: &mut BTreeMap<String, BTreeMap<String, Value>>,
) -> Result<()> {
    for key in json_keys(out_dir)? {
        let value = read_value(&out_dir.join(format!("{key}.json")))?;
        let Value::Tree(series) = value else {
            return Err(StatsError::ShapeMismatch { key });
        };
        let _ = total.insert(key, series);
    }
    Ok(())
}

fn sorted_dir_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(names),
    };
    for entry in entries {
        let entry = entry.map_err(|e| StatsError::from(e).with_path(dir))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

fn json_keys(dir: &Path) -> Result<Vec<String>> {
    let mut keys = Vec::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(keys),
    };
    for entry in entries {
        let entry = entry.map_err(|e| StatsError::from(e).with_path(dir))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(stem) = name.strip_suffix(".json") {
            keys.push(stem.to_string());
        }
    }
    keys.sort();
    Ok(keys)
}
