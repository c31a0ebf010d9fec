// tests/integration_pipeline.rs
use std::fs;
use std::path::PathBuf;

use aidstats_core::pipeline::{process_file, FileStats, PipelineOptions};
use aidstats_core::stats::Flavor;
use aidstats_core::value::Value;
use chrono::NaiveDate;
use tempfile::TempDir;

fn options() -> PipelineOptions {
    PipelineOptions::new(
        Flavor::Dashboard,
        NaiveDate::from_ymd_opt(2016, 6, 1).unwrap(),
    )
}

fn write_input(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn marker(stats: &FileStats, key: &str) -> Option<Value> {
    stats.file.get(key).cloned()
}

const ACTIVITIES_FILE: &str = r#"<iati-activities version="2.02">
    <iati-activity humanitarian="1">
        <iati-identifier>AA-BBB-1</iati-identifier>
        <title/>
        <activity-status code="2"/>
        <sector vocabulary="1" code="72010"/>
        <transaction>
            <transaction-type code="3"/>
            <value value-date="2015-03-01">100.25</value>
        </transaction>
    </iati-activity>
    <iati-activity>
        <iati-identifier>AA-BBB-2</iati-identifier>
        <activity-status code="3"/>
    </iati-activity>
</iati-activities>"#;

#[test]
fn an_activities_file_produces_file_and_element_mappings() {
    let tmp = TempDir::new().unwrap();
    let path = write_input(&tmp, "pub.xml", ACTIVITIES_FILE);

    let stats = process_file(&path, &options()).unwrap();

    assert_eq!(marker(&stats, "activity_files"), Some(Value::Count(1)));
    assert_eq!(
        marker(&stats, "versions").and_then(|v| v.get("2.02").cloned()),
        Some(Value::Count(1))
    );
    assert_eq!(stats.elements.len(), 2);

    let first = &stats.elements[0];
    assert_eq!(first.get("activities"), Some(&Value::Count(1)));
    assert_eq!(first.get("humanitarian"), Some(&Value::Count(1)));
    assert_eq!(first.get("current_activities"), Some(&Value::Count(1)));

    let second = &stats.elements[1];
    assert_eq!(second.get("humanitarian"), Some(&Value::Count(0)));
    assert_eq!(second.get("current_activities"), Some(&Value::Count(0)));
}

#[test]
fn humanitarian_flavor_filters_records_but_file_metrics_see_everything() {
    let tmp = TempDir::new().unwrap();
    let path = write_input(&tmp, "pub.xml", ACTIVITIES_FILE);

    let mut opts = options();
    opts.flavor = Flavor::Humanitarian;
    let stats = process_file(&path, &opts).unwrap();

    // Only the humanitarian activity reaches record dispatch.
    assert_eq!(stats.elements.len(), 1);
    assert_eq!(stats.elements[0].get("humanitarian"), Some(&Value::Count(1)));

    // The file-granularity pass still covers the whole document.
    assert_eq!(marker(&stats, "activity_files"), Some(Value::Count(1)));
}

#[test]
fn an_organisations_file_takes_the_organisation_path() {
    let tmp = TempDir::new().unwrap();
    let path = write_input(
        &tmp,
        "org.xml",
        r#"<iati-organisations version="2.02">
            <iati-organisation>
                <organisation-identifier>AA-BBB</organisation-identifier>
            </iati-organisation>
        </iati-organisations>"#,
    );

    let stats = process_file(&path, &options()).unwrap();
    assert_eq!(marker(&stats, "organisation_files"), Some(Value::Count(1)));
    assert_eq!(stats.elements.len(), 1);
    assert_eq!(
        stats.elements[0]
            .get("organisation_ids")
            .and_then(|v| v.get("AA-BBB")),
        Some(&Value::Count(1))
    );
}

#[test]
fn a_zero_byte_file_yields_the_empty_marker() {
    let tmp = TempDir::new().unwrap();
    let path = write_input(&tmp, "empty.xml", "");

    let stats = process_file(&path, &options()).unwrap();
    assert_eq!(marker(&stats, "emptyfile"), Some(Value::Count(1)));
    assert!(stats.elements.is_empty());
}

#[test]
fn a_corrupt_non_empty_file_yields_the_invalid_marker() {
    let tmp = TempDir::new().unwrap();
    let path = write_input(&tmp, "broken.xml", "<iati-activities><unclosed>");

    let stats = process_file(&path, &options()).unwrap();
    assert_eq!(marker(&stats, "invalidxml"), Some(Value::Count(1)));
    assert!(stats.elements.is_empty());
}

#[test]
fn an_oversized_file_records_its_exact_size_without_parsing() {
    let tmp = TempDir::new().unwrap();
    let content = "<iati-activities></iati-activities>";
    let path = write_input(&tmp, "big.xml", content);

    let mut opts = options();
    opts.max_file_bytes = 10;
    let stats = process_file(&path, &opts).unwrap();

    assert_eq!(marker(&stats, "toolarge"), Some(Value::Count(1)));
    assert_eq!(
        marker(&stats, "file_size"),
        Some(Value::Count(content.len() as u64))
    );
    assert!(stats.elements.is_empty());
}

#[test]
fn an_unrecognised_root_yields_the_nonstandard_marker() {
    let tmp = TempDir::new().unwrap();
    let path = write_input(&tmp, "odd.xml", "<something-else></something-else>");

    let stats = process_file(&path, &options()).unwrap();
    assert_eq!(marker(&stats, "nonstandardroots"), Some(Value::Count(1)));
    assert!(stats.elements.is_empty());
}

#[test]
fn transaction_totals_sum_decimals_exactly() {
    let tmp = TempDir::new().unwrap();
    let path = write_input(
        &tmp,
        "sums.xml",
        r#"<iati-activities version="2.02">
            <iati-activity>
                <transaction>
                    <transaction-type code="3"/>
                    <value>0.1</value>
                </transaction>
                <transaction>
                    <transaction-type code="3"/>
                    <value>0.2</value>
                </transaction>
            </iati-activity>
        </iati-activities>"#,
    );

    let stats = process_file(&path, &options()).unwrap();
    let totals = stats.elements[0].get("transaction_total_by_type").unwrap();
    assert_eq!(
        totals.get("3"),
        Some(&Value::Sum(
            rust_decimal::Decimal::from_str_exact("0.3").unwrap()
        ))
    );
}
