// src/stats/file.rs
//! File-granularity metric catalogs for both collection kinds.

use std::collections::BTreeMap;

use super::{tally, FileContext};
use crate::dispatch::Metric;
use crate::error::Result;
use crate::value::Value;

pub fn activity_file_metrics<'a>() -> Vec<(&'static str, Metric<FileContext<'a>>)> {
    vec![
        ("activity_files", activity_files),
        ("duplicate_identifiers", duplicate_identifiers),
        ("file_size", file_size),
        ("versions", versions),
    ]
}

pub fn organisation_file_metrics<'a>() -> Vec<(&'static str, Metric<FileContext<'a>>)> {
    vec![
        ("file_size", file_size),
        ("organisation_files", organisation_files),
        ("versions", versions),
    ]
}

fn activity_files(_ctx: &FileContext<'_>) -> Result<Value> {
    Ok(Value::Count(1))
}

fn organisation_files(_ctx: &FileContext<'_>) -> Result<Value> {
    Ok(Value::Count(1))
}

fn file_size(ctx: &FileContext<'_>) -> Result<Value> {
    Ok(Value::Count(ctx.file_size))
}

fn versions(ctx: &FileContext<'_>) -> Result<Value> {
    let mut tree = BTreeMap::new();
    tally(&mut tree, ctx.version.raw());
    Ok(Value::Tree(tree))
}

/// Identifiers reported by more than one activity in the same file, with
/// their occurrence counts. A catalog of bad data rather than a total: the
/// aggregator keeps it out of time-series merging.
fn duplicate_identifiers(ctx: &FileContext<'_>) -> Result<Value> {
    let mut seen: BTreeMap<String, Value> = BTreeMap::new();
    for activity in ctx.root.children_named("iati-activity") {
        if let Some(identifier) = activity.child_text("iati-identifier") {
            tally(&mut seen, identifier);
        }
    }
    let duplicates = seen
        .into_iter()
        .filter(|(_, count)| !matches!(count, Value::Count(1)))
        .collect();
    Ok(Value::Tree(duplicates))
}
