// src/stats/organisation.rs
//! Organisation-granularity metric catalog.

use std::collections::BTreeMap;

use super::{tally, OrganisationContext};
use crate::dispatch::Metric;
use crate::error::Result;
use crate::value::Value;

pub fn metrics<'a>() -> Vec<(&'static str, Metric<OrganisationContext<'a>>)> {
    vec![
        ("organisation_ids", organisation_ids),
        ("organisations", organisations),
    ]
}

fn organisations(_ctx: &OrganisationContext<'_>) -> Result<Value> {
    Ok(Value::Count(1))
}

fn organisation_ids(ctx: &OrganisationContext<'_>) -> Result<Value> {
    let mut tree = BTreeMap::new();
    // 2.x reports a child element, 1.x an attribute on the record itself.
    let identifier = ctx
        .element
        .child_text("organisation-identifier")
        .or_else(|| ctx.element.attr("ref"));
    if let Some(id) = identifier {
        tally(&mut tree, id);
    }
    Ok(Value::Tree(tree))
}
