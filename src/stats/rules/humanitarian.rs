// src/stats/rules/humanitarian.rs
//! Multi-signal humanitarian classification for one activity record.
//!
//! An activity can qualify through explicit markers or through recognised
//! humanitarian sector codes; an explicit activity-level opt-out vetoes
//! every positive signal.

use crate::model::{Node, Version};

const DAC_5_DIGIT_CODES: [&str; 5] = ["72010", "72040", "72050", "73010", "74010"];
const DAC_3_DIGIT_CODES: [&str; 3] = ["720", "730", "740"];

const TRUTHY: [&str; 2] = ["1", "true"];
const FALSY: [&str; 2] = ["0", "false"];

/// Classifies one activity element under the file's standard version.
#[must_use]
pub fn is_humanitarian(element: &Node, version: &Version) -> bool {
    if element.tag != "iati-activity" {
        return false;
    }

    // The marker attribute only entered the standard at 2.02; older files
    // may carry it but it has no defined meaning there.
    let marker_recognised = version.at_least_2_02();

    let activity_marker = element.attr("humanitarian");
    let truthy_on_activity = activity_marker.is_some_and(|v| TRUTHY.contains(&v));
    let falsy_on_activity = activity_marker.is_some_and(|v| FALSY.contains(&v));
    let truthy_on_transaction = element
        .child_attr_values("transaction", "humanitarian")
        .any(|v| TRUTHY.contains(&v));

    let by_attrib = marker_recognised
        && (truthy_on_activity || (truthy_on_transaction && !falsy_on_activity));

    let (vocab_5_digit, vocab_3_digit) = if version.is_v1_family() {
        ("DAC", "DAC-3")
    } else {
        ("1", "2")
    };

    let by_sector_activity = has_sector_code(element, vocab_5_digit, true, &DAC_5_DIGIT_CODES)
        || has_sector_code(element, vocab_3_digit, false, &DAC_3_DIGIT_CODES);

    let by_sector_transaction = element
        .children_named("transaction")
        .filter(|tx| {
            !tx.attr("humanitarian").is_some_and(|v| FALSY.contains(&v))
        })
        .any(|tx| {
            has_sector_code(tx, vocab_5_digit, true, &DAC_5_DIGIT_CODES)
                || has_sector_code(tx, vocab_3_digit, false, &DAC_3_DIGIT_CODES)
        });

    let by_sector = by_sector_activity || (by_sector_transaction && marker_recognised);

    let mut humanitarian = by_attrib || by_sector;

    // The explicit opt-out wins over everything, at every version.
    if falsy_on_activity {
        humanitarian = false;
    }
    humanitarian
}

/// True when `parent` carries a sector child with a recognised code under
/// the given vocabulary. The 5-digit vocabulary is the default one, so an
/// absent vocabulary attribute also matches; 3-digit codes require the
/// vocabulary to be spelled out.
fn has_sector_code(
    parent: &Node,
    vocabulary: &str,
    absent_matches: bool,
    codes: &[&str],
) -> bool {
    parent
        .children_named("sector")
        .filter(|sector| match sector.attr("vocabulary") {
            Some(v) => v == vocabulary,
            None => absent_matches,
        })
        .filter_map(|sector| sector.attr("code"))
        .any(|code| codes.contains(&code))
}
