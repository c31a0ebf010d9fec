// src/dispatch.rs
//! Metric dispatch: runs every enabled metric of a catalog against one bound
//! context, isolating per-metric failures.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;

use crate::error::{Result, StatsError};
use crate::value::Value;

/// A metric is a named pure function from a bound context to a result-tree
/// value. Catalogs are plain name/function slices; helpers stay private fns
/// and never enter a catalog.
pub type Metric<C> = fn(&C) -> Result<Value>;

/// Which of a catalog's metrics a flavor enables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Default policy: every catalog entry except the listed names.
    AllExcept(&'static [&'static str]),
    /// Override policy for specialised views: only the listed names.
    Only(&'static [&'static str]),
}

impl Policy {
    #[must_use]
    pub fn enables(&self, name: &str) -> bool {
        match self {
            Policy::AllExcept(excluded) => !excluded.contains(&name),
            Policy::Only(allowed) => allowed.contains(&name),
        }
    }
}

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Records an operator cancellation request. The next metric boundary turns
/// it into the run-fatal `StatsError::Interrupted`.
pub fn request_interrupt() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

#[must_use]
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Clears a previously recorded interrupt. Exists for process reuse in tests
/// and embedding; the CLI never clears.
pub fn clear_interrupt() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

/// Runs every enabled metric and collects the successful results into a tree
/// keyed by metric name.
///
/// A failing metric is reported to the diagnostics stream and omitted; its
/// siblings still run. Only an operator interrupt aborts the pass.
pub fn dispatch<C>(
    metrics: &[(&'static str, Metric<C>)],
    policy: &Policy,
    ctx: &C,
    provenance: &str,
    debug: bool,
) -> Result<Value> {
    let mut out = BTreeMap::new();
    for (name, metric) in metrics {
        if !policy.enables(name) {
            continue;
        }
        if interrupted() {
            return Err(StatsError::Interrupted);
        }
        match metric(ctx) {
            Ok(value) => {
                let _ = out.insert((*name).to_string(), value);
            }
            Err(StatsError::Interrupted) => return Err(StatsError::Interrupted),
            Err(err) => {
                eprintln!(
                    "{} metric '{}' failed {}: {}",
                    "warn:".yellow(),
                    name,
                    provenance,
                    err
                );
            }
        }
    }

    let tree = Value::Tree(out);
    if debug {
        if let Ok(rendered) = serde_json::to_string(&tree) {
            eprintln!("{} {} {}", "debug:".cyan(), provenance, rendered);
        }
    }
    Ok(tree)
}
