// src/stats/activity.rs
//! The activity-granularity metric catalog.
//!
//! Every metric is a pure function of the bound context and returns its own
//! result subtree; the dispatcher assembles them under the metric names
//! listed in [`metrics`].

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::{rules, tally, ActivityContext};
use crate::dispatch::Metric;
use crate::error::Result;
use crate::model::{parse_iso_date, Node};
use crate::value::Value;

/// Name/function catalog for activity records, alphabetical by name.
pub fn metrics<'a>() -> Vec<(&'static str, Metric<ActivityContext<'a>>)> {
    vec![
        ("activities", activities),
        ("activity_dates", activity_dates),
        ("comprehensiveness", comprehensiveness),
        ("current_activities", current_activities),
        ("hierarchies", hierarchies),
        ("humanitarian", humanitarian),
        ("most_recent_transaction_date", most_recent_transaction_date),
        ("sectors", sectors),
        ("transaction_months_with_year", transaction_months_with_year),
        ("transaction_total_by_type", transaction_total_by_type),
    ]
}

fn activities(_ctx: &ActivityContext<'_>) -> Result<Value> {
    Ok(Value::Count(1))
}

fn activity_dates(ctx: &ActivityContext<'_>) -> Result<Value> {
    let mut by_type = BTreeMap::new();
    for kind in ctx.element.child_attr_values("activity-date", "type") {
        tally(&mut by_type, kind);
    }
    Ok(Value::Tree(by_type))
}

fn comprehensiveness(ctx: &ActivityContext<'_>) -> Result<Value> {
    Ok(rules::comprehensiveness(ctx.element))
}

fn current_activities(ctx: &ActivityContext<'_>) -> Result<Value> {
    Ok(Value::Count(u64::from(rules::is_current(
        ctx.element,
        ctx.today,
    ))))
}

fn hierarchies(ctx: &ActivityContext<'_>) -> Result<Value> {
    // Unreported hierarchy means a standalone activity, level 1.
    let level = ctx.element.attr("hierarchy").unwrap_or("1");
    let mut tree = BTreeMap::new();
    tally(&mut tree, level);
    Ok(Value::Tree(tree))
}

fn humanitarian(ctx: &ActivityContext<'_>) -> Result<Value> {
    Ok(Value::Count(u64::from(rules::is_humanitarian(
        ctx.element,
        ctx.version,
    ))))
}

fn most_recent_transaction_date(ctx: &ActivityContext<'_>) -> Result<Value> {
    let latest = ctx
        .element
        .children_named("transaction")
        .filter_map(transaction_date)
        .max();
    let mut tree = BTreeMap::new();
    if let Some(date) = latest {
        tally(&mut tree, &date.format("%Y-%m-%d").to_string());
    }
    Ok(Value::Tree(tree))
}

fn sectors(ctx: &ActivityContext<'_>) -> Result<Value> {
    let mut by_code = BTreeMap::new();
    for code in ctx.element.child_attr_values("sector", "code") {
        tally(&mut by_code, code);
    }
    Ok(Value::Tree(by_code))
}

fn transaction_months_with_year(ctx: &ActivityContext<'_>) -> Result<Value> {
    let mut by_month = BTreeMap::new();
    for date in ctx
        .element
        .children_named("transaction")
        .filter_map(transaction_date)
    {
        tally(&mut by_month, &format!("{}-{}", date.year(), date.month()));
    }
    Ok(Value::Tree(by_month))
}

fn transaction_total_by_type(ctx: &ActivityContext<'_>) -> Result<Value> {
    let mut by_type: BTreeMap<String, Value> = BTreeMap::new();
    for transaction in ctx.element.children_named("transaction") {
        let Some(code) = transaction
            .child("transaction-type")
            .and_then(|t| t.attr("code"))
        else {
            continue;
        };
        let Some(amount) = transaction
            .child_text("value")
            .and_then(|raw| Decimal::from_str_exact(raw).ok())
        else {
            continue;
        };
        by_type
            .entry(code.to_string())
            .or_insert(Value::Sum(Decimal::ZERO))
            .merge(Value::Sum(amount))?;
    }
    Ok(Value::Tree(by_type))
}

/// The effective date of a transaction: its transaction-date, or the value
/// date when no transaction-date is reported.
fn transaction_date(transaction: &Node) -> Option<NaiveDate> {
    transaction
        .child("transaction-date")
        .and_then(|d| d.attr("iso-date").or(d.text.as_deref()))
        .or_else(|| {
            transaction
                .child("value")
                .and_then(|v| v.attr("value-date"))
        })
        .and_then(parse_iso_date)
}
