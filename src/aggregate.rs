// src/aggregate.rs
//! Folding result trees: one file's output into a per-file aggregate, many
//! per-file aggregates into a folder total.
//!
//! All mutation lives here, in the single-threaded reduce phase; workers only
//! ever produce immutable trees.

use std::collections::BTreeMap;

use crate::error::{Result, StatsError};
use crate::pipeline::FileStats;
use crate::value::Value;

/// Sequence-valued keys that re-enter aggregation by merging their elements.
/// Everything else list-shaped is per-record detail and is dropped from
/// aggregate scope.
pub const SEQUENCE_OPT_IN: &[&str] = &[];

/// Folds one file's output (file mapping plus every record mapping) into a
/// single per-file aggregate tree.
pub fn aggregate_file(stats: &FileStats) -> Result<Value> {
    let mut total = Value::empty_tree();
    merge_summable(&mut total, &stats.file)?;
    for element in &stats.elements {
        merge_summable(&mut total, element)?;
    }
    Ok(total)
}

/// Folds any number of per-file aggregates into one combined tree. Merge is
/// associative and commutative, so fold order never changes the result.
pub fn aggregate_folder<'a, I>(trees: I) -> Result<Value>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut total = Value::empty_tree();
    for tree in trees {
        merge_summable(&mut total, tree)?;
    }
    Ok(total)
}

/// Merges `tree` into `total` after stripping non-summable sequences.
pub fn merge_summable(total: &mut Value, tree: &Value) -> Result<()> {
    match strip_sequences(tree) {
        Some(clean) => total.merge(clean),
        None => Ok(()),
    }
}

fn strip_sequences(value: &Value) -> Option<Value> {
    match value {
        Value::Tree(map) => {
            let mut clean = BTreeMap::new();
            for (key, child) in map {
                match child {
                    Value::List(items) if SEQUENCE_OPT_IN.contains(&key.as_str()) => {
                        if let Ok(folded) = collapse(items) {
                            let _ = clean.insert(key.clone(), folded);
                        }
                    }
                    Value::List(_) => {}
                    other => {
                        if let Some(kept) = strip_sequences(other) {
                            let _ = clean.insert(key.clone(), kept);
                        }
                    }
                }
            }
            Some(Value::Tree(clean))
        }
        Value::List(_) => None,
        scalar => Some(scalar.clone()),
    }
}

/// An opted-in sequence collapses to the merge of its elements.
fn collapse(items: &[Value]) -> Result<Value> {
    let mut folded = Value::empty_tree();
    for item in items {
        merge_summable(&mut folded, item)?;
    }
    Ok(folded)
}

/// Checks that a value loaded for aggregation is tree-shaped; inputs with a
/// scalar or sequence at the top are corrupt.
pub fn expect_tree(value: &Value, key: &str) -> Result<()> {
    if value.as_tree().is_some() {
        Ok(())
    } else {
        Err(StatsError::ShapeMismatch {
            key: key.to_string(),
        })
    }
}
