// src/stats/rules/comprehensiveness.rs
//! Data-completeness scoring for one activity record.

use std::collections::BTreeMap;

use crate::model::Node;
use crate::value::Value;

/// The fixed criterion set. Output always carries all nine keys, each 0 or 1,
/// even for an empty record.
pub const CRITERIA: [&str; 9] = [
    "reporting-org",
    "iati-identifier",
    "participating-org",
    "title",
    "description",
    "activity-status",
    "activity-date",
    "sector",
    "country_or_region",
];

/// Scores each criterion 0/1 for one activity element.
#[must_use]
pub fn comprehensiveness(element: &Node) -> Value {
    let mut scores = BTreeMap::new();
    for criterion in CRITERIA {
        let score = match criterion {
            "sector" => transaction_scoped(element, &["sector"]),
            "country_or_region" => {
                transaction_scoped(element, &["recipient-country", "recipient-region"])
            }
            direct => u64::from(element.has_child(direct)),
        };
        let _ = scores.insert(criterion.to_string(), Value::Count(score));
    }
    Value::Tree(scores)
}

/// Sector and country-or-region may live on the activity or inside its
/// transactions. A direct element always scores; otherwise every transaction
/// must carry a qualifying element (all-or-nothing), and an activity with no
/// transactions scores nothing.
fn transaction_scoped(element: &Node, qualifying: &[&str]) -> u64 {
    if qualifying.iter().any(|tag| element.has_child(tag)) {
        return 1;
    }
    let mut transactions = element.children_named("transaction").peekable();
    if transactions.peek().is_none() {
        return 0;
    }
    u64::from(transactions.all(|tx| qualifying.iter().any(|tag| tx.has_child(tag))))
}
