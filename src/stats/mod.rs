// src/stats/mod.rs
//! Metric catalogs, bound contexts, and reporting flavors.
//!
//! A flavor is configuration data, not a class hierarchy: every flavor
//! shares the same catalogs and rule logic and differs only in which metric
//! names it enables per granularity, plus an optional record filter.

pub mod activity;
pub mod file;
pub mod organisation;
pub mod publisher;
pub mod rules;

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::dispatch::Policy;
use crate::error::StatsError;
use crate::model::{Node, Version};
use crate::value::Value;

/// Binding of one activity record for a single dispatch pass.
#[derive(Debug)]
pub struct ActivityContext<'a> {
    pub element: &'a Node,
    pub version: &'a Version,
    pub strict: bool,
    pub context: &'a str,
    pub today: NaiveDate,
}

/// Binding of one organisation record for a single dispatch pass.
#[derive(Debug)]
pub struct OrganisationContext<'a> {
    pub element: &'a Node,
    pub version: &'a Version,
    pub strict: bool,
    pub context: &'a str,
}

/// Binding of one whole input file. File-granularity metrics always see the
/// full document, whatever record filter the flavor applies below them.
#[derive(Debug)]
pub struct FileContext<'a> {
    pub root: &'a Node,
    pub version: &'a Version,
    pub fname: &'a str,
    pub inputfile: &'a Path,
    pub file_size: u64,
    pub strict: bool,
    pub context: &'a str,
}

/// Binding of one publisher folder's combined aggregate.
#[derive(Debug)]
pub struct PublisherContext<'a> {
    pub folder: &'a str,
    pub aggregated: &'a Value,
    pub today: NaiveDate,
}

/// Binding of the whole corpus after folder aggregation.
#[derive(Debug)]
pub struct CorpusContext<'a> {
    pub publisher_count: u64,
    pub aggregated: &'a Value,
}

/// Bumps an occurrence counter inside a tree of counts.
pub(crate) fn tally(tree: &mut BTreeMap<String, Value>, key: &str) {
    match tree.get_mut(key) {
        Some(Value::Count(n)) => *n += 1,
        _ => {
            let _ = tree.insert(key.to_string(), Value::Count(1));
        }
    }
}

/// Restricts which records of a file reach record-granularity dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFilter {
    All,
    HumanitarianOnly,
}

/// A named reporting view: same rules, different enabled-metric sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Dashboard,
    Timeliness,
    Humanitarian,
}

impl Flavor {
    pub fn from_name(name: &str) -> crate::error::Result<Self> {
        match name {
            "dashboard" => Ok(Flavor::Dashboard),
            "timeliness" => Ok(Flavor::Timeliness),
            "humanitarian" => Ok(Flavor::Humanitarian),
            other => Err(StatsError::UnknownFlavor(other.to_string())),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Flavor::Dashboard => "dashboard",
            Flavor::Timeliness => "timeliness",
            Flavor::Humanitarian => "humanitarian",
        }
    }

    #[must_use]
    pub const fn record_filter(&self) -> RecordFilter {
        match self {
            Flavor::Humanitarian => RecordFilter::HumanitarianOnly,
            _ => RecordFilter::All,
        }
    }

    #[must_use]
    pub const fn activity_policy(&self) -> Policy {
        match self {
            Flavor::Dashboard => Policy::AllExcept(&[]),
            Flavor::Timeliness => Policy::Only(&[
                "most_recent_transaction_date",
                "transaction_months_with_year",
            ]),
            Flavor::Humanitarian => Policy::Only(&[
                "activities",
                "humanitarian",
                "transaction_total_by_type",
            ]),
        }
    }

    #[must_use]
    pub const fn activity_file_policy(&self) -> Policy {
        match self {
            Flavor::Timeliness => Policy::Only(&[]),
            _ => Policy::AllExcept(&[]),
        }
    }

    #[must_use]
    pub const fn organisation_policy(&self) -> Policy {
        match self {
            Flavor::Dashboard => Policy::AllExcept(&[]),
            _ => Policy::Only(&[]),
        }
    }

    #[must_use]
    pub const fn organisation_file_policy(&self) -> Policy {
        match self {
            Flavor::Dashboard => Policy::AllExcept(&[]),
            _ => Policy::Only(&[]),
        }
    }

    #[must_use]
    pub const fn publisher_policy(&self) -> Policy {
        match self {
            Flavor::Timeliness => Policy::Only(&["timelag"]),
            _ => Policy::AllExcept(&[]),
        }
    }

    #[must_use]
    pub const fn corpus_policy(&self) -> Policy {
        match self {
            Flavor::Timeliness => Policy::Only(&[]),
            _ => Policy::AllExcept(&[]),
        }
    }
}
