// src/stats/publisher.rs
//! Publisher-folder and whole-corpus metric catalogs.
//!
//! These run during the reduce phase, bound to already-combined aggregates
//! rather than to records.

use std::collections::BTreeMap;

use chrono::Datelike;

use super::{tally, CorpusContext, PublisherContext};
use crate::dispatch::Metric;
use crate::error::Result;
use crate::value::Value;

pub fn publisher_metrics<'a>() -> Vec<(&'static str, Metric<PublisherContext<'a>>)> {
    vec![("publishers", publishers), ("timelag", timelag)]
}

pub fn corpus_metrics<'a>() -> Vec<(&'static str, Metric<CorpusContext<'a>>)> {
    vec![
        ("activity_files_total", activity_files_total),
        ("publisher_count", publisher_count),
    ]
}

fn publishers(_ctx: &PublisherContext<'_>) -> Result<Value> {
    Ok(Value::Count(1))
}

/// How far behind this publisher's most recent reported transaction month
/// sits, bucketed for the dashboard.
fn timelag(ctx: &PublisherContext<'_>) -> Result<Value> {
    let latest = ctx
        .aggregated
        .get("transaction_months_with_year")
        .and_then(Value::as_tree)
        .map(|months| months.keys().filter_map(|k| parse_month(k)).max())
        .unwrap_or(None);

    let mut tree = BTreeMap::new();
    let bucket = match latest {
        None => "no transactions",
        Some((year, month)) => {
            let lag = months_between(year, month, ctx.today.year(), ctx.today.month());
            match lag {
                _ if lag <= 1 => "one month",
                _ if lag <= 3 => "a quarter",
                _ if lag <= 6 => "six months",
                _ if lag <= 12 => "one year",
                _ => "more than one year",
            }
        }
    };
    tally(&mut tree, bucket);
    Ok(Value::Tree(tree))
}

fn parse_month(key: &str) -> Option<(i32, u32)> {
    let (year, month) = key.rsplit_once('-')?;
    Some((year.parse().ok()?, month.parse().ok()?))
}

fn months_between(from_year: i32, from_month: u32, to_year: i32, to_month: u32) -> i64 {
    let from = i64::from(from_year) * 12 + i64::from(from_month);
    let to = i64::from(to_year) * 12 + i64::from(to_month);
    (to - from).max(0)
}

fn publisher_count(ctx: &CorpusContext<'_>) -> Result<Value> {
    Ok(Value::Count(ctx.publisher_count))
}

fn activity_files_total(ctx: &CorpusContext<'_>) -> Result<Value> {
    Ok(ctx
        .aggregated
        .get("activity_files")
        .cloned()
        .unwrap_or(Value::Count(0)))
}
