// src/runner.rs
//! Fan-out of the file pipeline across a worker pool, and the reduce passes
//! that fold worker output into folder, publisher, and corpus aggregates.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use walkdir::WalkDir;

use crate::aggregate::{aggregate_file, aggregate_folder, expect_tree, merge_summable};
use crate::dispatch::{dispatch, interrupted};
use crate::error::{Result, StatsError};
use crate::pipeline::{process_file, PipelineOptions};
use crate::stats::publisher::{corpus_metrics, publisher_metrics};
use crate::stats::{CorpusContext, PublisherContext};
use crate::value::{read_value, write_json, Value};

/// One input file queued for a worker: the file plus its publisher folder.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub inputfile: PathBuf,
    pub folder: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub data: PathBuf,
    pub output: PathBuf,
    /// Restrict the run to a single publisher folder.
    pub folder: Option<String>,
    /// Skip files whose output already exists.
    pub new_only: bool,
    /// Write the full per-record output per file instead of aggregating;
    /// in this mode there is no fan-in at all.
    pub verbose_loop: bool,
    pub pipeline: PipelineOptions,
}

#[derive(Debug, Clone, Default)]
pub struct LoopSummary {
    pub processed: usize,
    pub skipped: usize,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Default)]
pub struct AggregateSummary {
    pub folders: usize,
    pub files: usize,
    pub duration_ms: u128,
}

/// Lists every file under every publisher folder of the data directory.
/// Folder layout is one level deep; `.git` and stray files are ignored.
pub fn discover(data: &Path, restriction: Option<&str>) -> Result<Vec<WorkItem>> {
    let mut items = Vec::new();
    for entry in WalkDir::new(data)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| StatsError::Io {
            source: e.into(),
            path: data.to_path_buf(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(folder) = entry
            .path()
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
        else {
            continue;
        };
        if folder == ".git" {
            continue;
        }
        if restriction.is_some_and(|only| only != folder) {
            continue;
        }
        items.push(WorkItem {
            inputfile: entry.path().to_path_buf(),
            folder,
            name: entry.file_name().to_string_lossy().into_owned(),
        });
    }
    Ok(items)
}

/// Fans the pipeline out over every discovered file.
///
/// Each worker reads its own input and writes its own output file; nothing
/// is shared, so fold order cannot matter and an interrupt simply stops
/// scheduling more work.
pub fn run_loop(opts: &RunnerOptions) -> Result<LoopSummary> {
    let start = Instant::now();
    let items = discover(&opts.data, opts.folder.as_deref())?;

    let outcomes: Vec<Result<bool>> = items
        .par_iter()
        .map(|item| process_item(item, opts))
        .collect();

    let mut summary = LoopSummary::default();
    for outcome in outcomes {
        if outcome? {
            summary.processed += 1;
        } else {
            summary.skipped += 1;
        }
    }
    summary.duration_ms = start.elapsed().as_millis();
    Ok(summary)
}

/// Runs one work item to completion. Returns false when `new_only` skipped
/// the file.
fn process_item(item: &WorkItem, opts: &RunnerOptions) -> Result<bool> {
    if interrupted() {
        return Err(StatsError::Interrupted);
    }

    let subdir = if opts.verbose_loop {
        "loop"
    } else {
        "aggregated-file"
    };
    let outputfile = opts
        .output
        .join(subdir)
        .join(&item.folder)
        .join(format!("{}.json", item.name));

    if opts.new_only && outputfile.exists() {
        return Ok(false);
    }

    let stats = process_file(&item.inputfile, &opts.pipeline)?;
    if opts.verbose_loop {
        write_json(&outputfile, &stats)?;
    } else {
        write_json(&outputfile, &aggregate_file(&stats)?)?;
    }
    Ok(true)
}

/// The reduce phase: folds per-file aggregates into one tree per publisher
/// folder, runs the publisher metric pass over each, then the corpus pass
/// over everything. Single-threaded by design; this is the only place the
/// running totals are mutated.
pub fn run_aggregate(opts: &RunnerOptions) -> Result<AggregateSummary> {
    let start = Instant::now();
    let source = opts.output.join("aggregated-file");
    let mut summary = AggregateSummary::default();
    let mut corpus_total = Value::empty_tree();

    for folder in folder_names(&source, opts.folder.as_deref())? {
        if interrupted() {
            return Err(StatsError::Interrupted);
        }

        let mut per_file = Vec::new();
        for entry in WalkDir::new(source.join(&folder))
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| StatsError::Io {
                source: e.into(),
                path: source.join(&folder),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let value = read_value(entry.path())?;
            expect_tree(&value, &folder)?;
            per_file.push(value);
            summary.files += 1;
        }

        let mut folder_total = aggregate_folder(per_file.iter())?;
        let ctx = PublisherContext {
            folder: &folder,
            aggregated: &folder_total,
            today: opts.pipeline.today,
        };
        let publisher_tree = dispatch(
            &publisher_metrics(),
            &opts.pipeline.flavor.publisher_policy(),
            &ctx,
            &folder,
            opts.pipeline.debug,
        )?;
        folder_total.merge(publisher_tree)?;

        write_json(
            &opts.output.join("aggregated").join(format!("{folder}.json")),
            &folder_total,
        )?;
        merge_summable(&mut corpus_total, &folder_total)?;
        summary.folders += 1;
    }

    let ctx = CorpusContext {
        publisher_count: summary.folders as u64,
        aggregated: &corpus_total,
    };
    let corpus_tree = dispatch(
        &corpus_metrics(),
        &opts.pipeline.flavor.corpus_policy(),
        &ctx,
        "across all publishers",
        opts.pipeline.debug,
    )?;
    corpus_total.merge(corpus_tree)?;
    write_json(&opts.output.join("all.json"), &corpus_total)?;

    summary.duration_ms = start.elapsed().as_millis();
    Ok(summary)
}

fn folder_names(source: &Path, restriction: Option<&str>) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let entries = match std::fs::read_dir(source) {
        Ok(entries) => entries,
        Err(_) => return Ok(names),
    };
    for entry in entries {
        let entry = entry.map_err(|e| StatsError::from(e).with_path(source))?;
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if restriction.is_some_and(|only| only != name) {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}
