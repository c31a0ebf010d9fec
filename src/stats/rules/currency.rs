// src/stats/rules/currency.rs
//! Whether an activity's data is still live as of a reference date.

use chrono::{Datelike, NaiveDate};

use crate::model::{parse_iso_date, Node};

/// Status code for an activity under implementation; every other reported
/// status closes the activity for currency purposes.
const STATUS_IMPLEMENTATION: &str = "2";

/// End-of-activity date types, planned and actual, across standard versions.
/// Start dates never influence currency.
const END_DATE_TYPES: [&str; 4] = ["end-planned", "end-actual", "3", "4"];

/// Decides whether an activity is current as of `today`.
///
/// The status check always takes precedence: a reported status other than
/// implementation is never current, whatever its dates say. With no end
/// dates at all the activity is current by default; otherwise one end date
/// in or after the reference year suffices.
#[must_use]
pub fn is_current(element: &Node, today: NaiveDate) -> bool {
    let mut status_codes = element.child_attr_values("activity-status", "code");
    if let Some(code) = status_codes.next() {
        if code != STATUS_IMPLEMENTATION {
            return false;
        }
    }

    let mut end_dates = element
        .children_named("activity-date")
        .filter(|date| {
            date.attr("type")
                .is_some_and(|kind| END_DATE_TYPES.contains(&kind))
        })
        .filter_map(date_of)
        .peekable();

    if end_dates.peek().is_none() {
        return true;
    }
    end_dates.any(|date| date.year() >= today.year())
}

fn date_of(node: &Node) -> Option<NaiveDate> {
    node.attr("iso-date")
        .or(node.text.as_deref())
        .and_then(parse_iso_date)
}
