// tests/unit_history.rs
use std::fs;
use std::path::Path;

use aidstats_core::history::{gitaggregate, HistoryOptions};
use aidstats_core::value::{read_value, Value};
use tempfile::TempDir;

fn write_snapshot(gitout: &Path, commit: &str, key: &str, json: &str) {
    let dir = gitout.join("commits").join(commit).join("aggregated");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{key}.json")), json).unwrap();
}

fn series_keys(value: &Value) -> Vec<String> {
    value.as_tree().unwrap().keys().cloned().collect()
}

#[test]
fn snapshots_pivot_into_one_series_per_metric_key() {
    let tmp = TempDir::new().unwrap();
    let gitout = tmp.path().join("gitout");
    write_snapshot(&gitout, "aaa111", "activities", r#"{"total": 3}"#);
    write_snapshot(&gitout, "bbb222", "activities", r#"{"total": 5}"#);

    let summary = gitaggregate(&HistoryOptions {
        gitout: gitout.clone(),
        dated: false,
        dates_file: gitout.join("gitdate.json"),
    })
    .unwrap();

    assert_eq!(summary.keys, 1);
    assert_eq!(summary.snapshots_added, 2);

    let series = read_value(&gitout.join("gitaggregate").join("activities.json")).unwrap();
    assert_eq!(series_keys(&series), vec!["aaa111", "bbb222"]);
    assert_eq!(
        series.get("aaa111").and_then(|v| v.get("total")),
        Some(&Value::Count(3))
    );
}

#[test]
fn dated_mode_keys_by_date_and_skips_unmapped_snapshots() {
    let tmp = TempDir::new().unwrap();
    let gitout = tmp.path().join("gitout");
    write_snapshot(&gitout, "aaa111", "activities", r#"{"total": 3}"#);
    write_snapshot(&gitout, "unmapped", "activities", r#"{"total": 9}"#);

    let dates_file = tmp.path().join("gitdate.json");
    fs::write(&dates_file, r#"{"aaa111": "2015-03-01"}"#).unwrap();

    let summary = gitaggregate(&HistoryOptions {
        gitout: gitout.clone(),
        dated: true,
        dates_file,
    })
    .unwrap();

    assert_eq!(summary.snapshots_added, 1);
    assert_eq!(summary.snapshots_skipped, 1);

    let series = read_value(&gitout.join("gitaggregate-dated").join("activities.json")).unwrap();
    assert_eq!(series_keys(&series), vec!["2015-03-01"]);
}

#[test]
fn detail_only_keys_stay_out_of_the_time_series() {
    let tmp = TempDir::new().unwrap();
    let gitout = tmp.path().join("gitout");
    write_snapshot(&gitout, "aaa111", "activities", r#"{"total": 3}"#);
    write_snapshot(&gitout, "aaa111", "duplicate_identifiers", r#"{"ID-1": 2}"#);

    let summary = gitaggregate(&HistoryOptions {
        gitout: gitout.clone(),
        dated: false,
        dates_file: gitout.join("gitdate.json"),
    })
    .unwrap();

    assert_eq!(summary.keys, 1);
    assert!(!gitout
        .join("gitaggregate")
        .join("duplicate_identifiers.json")
        .exists());
}

#[test]
fn rerunning_never_double_adds_a_snapshot() {
    let tmp = TempDir::new().unwrap();
    let gitout = tmp.path().join("gitout");
    write_snapshot(&gitout, "aaa111", "activities", r#"{"total": 3}"#);

    let opts = HistoryOptions {
        gitout: gitout.clone(),
        dated: false,
        dates_file: gitout.join("gitdate.json"),
    };
    gitaggregate(&opts).unwrap();
    let second = gitaggregate(&opts).unwrap();

    assert_eq!(second.snapshots_added, 0, "existing snapshot must be kept, not re-added");
    let series = read_value(&gitout.join("gitaggregate").join("activities.json")).unwrap();
    assert_eq!(
        series.get("aaa111").and_then(|v| v.get("total")),
        Some(&Value::Count(3))
    );
}
