// src/reporting.rs
//! Console summaries. Result data goes to JSON files; only progress and
//! diagnostics reach the terminal.

use colored::Colorize;

use crate::history::HistorySummary;
use crate::runner::{AggregateSummary, LoopSummary};

pub fn print_loop_summary(summary: &LoopSummary) {
    let skipped = if summary.skipped > 0 {
        format!(" ({} already present, skipped)", summary.skipped)
    } else {
        String::new()
    };
    println!(
        "{} Processed {} files in {}ms.{}",
        "OK".green().bold(),
        summary.processed,
        summary.duration_ms,
        skipped
    );
}

pub fn print_aggregate_summary(summary: &AggregateSummary) {
    println!(
        "{} Aggregated {} files across {} publisher folders in {}ms.",
        "OK".green().bold(),
        summary.files,
        summary.folders,
        summary.duration_ms
    );
}

pub fn print_history_summary(summary: &HistorySummary) {
    let skipped = if summary.snapshots_skipped > 0 {
        format!(" ({} undated snapshots skipped)", summary.snapshots_skipped)
    } else {
        String::new()
    };
    println!(
        "{} Time series updated: {} metric keys, {} new snapshots.{}",
        "OK".green().bold(),
        summary.keys,
        summary.snapshots_added,
        skipped
    );
}

pub fn print_interrupted() {
    eprintln!(
        "{}",
        "Interrupted. Partial output left as flushed; treat this run as incomplete."
            .red()
            .bold()
    );
}
