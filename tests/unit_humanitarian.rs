// tests/unit_humanitarian.rs
use aidstats_core::model::{parse_document, Node, Version};
use aidstats_core::stats::rules::is_humanitarian;

fn activity(xml: &str) -> Node {
    parse_document(xml.as_bytes()).expect("fixture parses").root
}

fn v(raw: &str) -> Version {
    Version::parse(raw)
}

#[test]
fn truthy_attribute_counts_from_2_02() {
    let element = activity(r#"<iati-activity humanitarian="1"/>"#);
    assert!(is_humanitarian(&element, &v("2.02")));
    assert!(is_humanitarian(&element, &v("2.03")));

    let element = activity(r#"<iati-activity humanitarian="true"/>"#);
    assert!(is_humanitarian(&element, &v("2.02")));
}

#[test]
fn truthy_attribute_is_ignored_before_2_02() {
    let element = activity(r#"<iati-activity humanitarian="1"/>"#);
    assert!(!is_humanitarian(&element, &v("2.01")));
    assert!(!is_humanitarian(&element, &v("1.05")));
}

#[test]
fn transaction_marker_counts_without_activity_opt_out() {
    let element = activity(
        r#"<iati-activity><transaction humanitarian="1"/></iati-activity>"#,
    );
    assert!(is_humanitarian(&element, &v("2.02")));
    assert!(!is_humanitarian(&element, &v("2.01")));
}

#[test]
fn five_digit_sector_code_counts_at_any_version() {
    // Explicit default vocabulary, 2.x naming.
    let element = activity(
        r#"<iati-activity><sector vocabulary="1" code="72010"/></iati-activity>"#,
    );
    assert!(is_humanitarian(&element, &v("2.02")));

    // Absent vocabulary counts as the default vocabulary.
    let element = activity(r#"<iati-activity><sector code="72010"/></iati-activity>"#);
    assert!(is_humanitarian(&element, &v("2.02")));
    assert!(is_humanitarian(&element, &v("1.01")));

    // Legacy vocabulary naming for the 1.x family.
    let element = activity(
        r#"<iati-activity><sector vocabulary="DAC" code="74010"/></iati-activity>"#,
    );
    assert!(is_humanitarian(&element, &v("1.03")));
    assert!(!is_humanitarian(&element, &v("2.02")));
}

#[test]
fn three_digit_sector_code_requires_explicit_vocabulary() {
    let element = activity(
        r#"<iati-activity><sector vocabulary="2" code="720"/></iati-activity>"#,
    );
    assert!(is_humanitarian(&element, &v("2.02")));

    let element = activity(r#"<iati-activity><sector code="720"/></iati-activity>"#);
    assert!(!is_humanitarian(&element, &v("2.02")));

    let element = activity(
        r#"<iati-activity><sector vocabulary="DAC-3" code="730"/></iati-activity>"#,
    );
    assert!(is_humanitarian(&element, &v("1.01")));
}

#[test]
fn unrelated_sector_codes_do_not_count() {
    let element = activity(r#"<iati-activity><sector code="11110"/></iati-activity>"#);
    assert!(!is_humanitarian(&element, &v("2.02")));
}

#[test]
fn transaction_sector_codes_count_from_2_02_only() {
    let element = activity(
        r#"<iati-activity>
            <transaction><sector code="72010"/></transaction>
        </iati-activity>"#,
    );
    assert!(is_humanitarian(&element, &v("2.02")));
    assert!(!is_humanitarian(&element, &v("1.05")));
}

#[test]
fn opted_out_transactions_do_not_contribute_sector_codes() {
    let element = activity(
        r#"<iati-activity>
            <transaction humanitarian="0"><sector code="72010"/></transaction>
        </iati-activity>"#,
    );
    assert!(!is_humanitarian(&element, &v("2.02")));
}

#[test]
fn activity_level_opt_out_vetoes_every_signal() {
    // Qualifying sector code plus a truthy transaction marker; the explicit
    // activity-level opt-out still wins.
    let element = activity(
        r#"<iati-activity humanitarian="0">
            <sector vocabulary="1" code="72010"/>
            <transaction humanitarian="1"/>
        </iati-activity>"#,
    );
    assert!(!is_humanitarian(&element, &v("2.02")));

    let element = activity(
        r#"<iati-activity humanitarian="false">
            <sector code="72010"/>
        </iati-activity>"#,
    );
    assert!(!is_humanitarian(&element, &v("2.02")));
}

#[test]
fn non_activity_elements_never_classify() {
    let element = activity(r#"<iati-organisation humanitarian="1"/>"#);
    assert!(!is_humanitarian(&element, &v("2.02")));
}
