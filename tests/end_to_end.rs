//! Load a dataset from disk and drive it through the public API.

use business_map::{
    AgeBucket, AppConfig, BusinessMap, CategoryFilter, DataSource, FilterCriteria, RenderOptions,
};
use chrono::NaiveDate;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_json(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn open(file: &NamedTempFile) -> BusinessMap {
    let source = DataSource::File(file.path().to_path_buf());
    let dataset = source.load().unwrap();
    BusinessMap::new(dataset, &AppConfig::default())
}

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
}

const SINGLE: &str = r#"[
    {"name": "A", "latitude": 58.9, "longitude": 5.7, "status": "Active",
     "industry": "Energi", "founded": "2024-01-01"}
]"#;

#[test]
fn single_record_is_visible_and_new() {
    let file = write_json(SINGLE);
    let map = open(&file);

    let plan = map.render(
        &FilterCriteria::default(),
        RenderOptions::default(),
        reference(),
    );
    assert_eq!(plan.visible_count, 1);
    assert_eq!(plan.header(), "Showing 1 active businesses from 1 total.");

    let entry = &plan.entries[0];
    assert_eq!(entry.age_months, Some(6));
    assert!(AgeBucket::New.contains(entry.age_months));

    // Six months sits on the new/growth boundary and belongs to both
    for bucket in [AgeBucket::New, AgeBucket::Growth] {
        let criteria = FilterCriteria {
            age: bucket,
            ..Default::default()
        };
        assert_eq!(map.count_visible(&criteria, reference()), 1, "{}", bucket);
    }
}

#[test]
fn area_filter_hides_record_without_municipality() {
    let file = write_json(SINGLE);
    let map = open(&file);

    let criteria = FilterCriteria {
        area: CategoryFilter::Exactly("Sandnes".to_string()),
        ..Default::default()
    };
    let plan = map.render(&criteria, RenderOptions::default(), reference());

    assert_eq!(plan.visible_count, 0);
    assert_eq!(plan.active_count, 1);
}

#[test]
fn two_industries_get_distinct_sorted_colors() {
    let file = write_json(
        r#"[
            {"name": "T", "latitude": 58.9, "longitude": 5.7, "industry": "Teknologi"},
            {"name": "E", "latitude": 58.9, "longitude": 5.7, "industry": "Energi"}
        ]"#,
    );
    let first = open(&file);
    let second = open(&file);

    let colors: Vec<_> = first.colors().iter().collect();
    assert_eq!(
        colors,
        vec![("Energi", "#007bff"), ("Teknologi", "#28a745")]
    );
    assert_eq!(first.colors(), second.colors());
}

#[test]
fn unmappable_and_inactive_records_never_show() {
    let file = write_json(
        r#"[
            {"name": "Ghost AS", "latitude": null, "longitude": 5.7},
            {"name": "Closed AS", "latitude": 58.9, "longitude": 5.7, "status": "Dissolved"},
            {"name": "Acme AS", "latitude": 58.9, "longitude": 5.7}
        ]"#,
    );
    let map = open(&file);

    let plan = map.render(
        &FilterCriteria::default(),
        RenderOptions::default(),
        reference(),
    );
    let labels: Vec<_> = plan.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Acme AS"]);

    for term in ["acme", "ACME", "Ac"] {
        let criteria = FilterCriteria {
            search: term.to_string(),
            ..Default::default()
        };
        assert_eq!(map.count_visible(&criteria, reference()), 1, "{}", term);
    }
}

#[test]
fn missing_file_reports_user_message() {
    let source = DataSource::File("/no/such/data_enriched.json".into());
    let err = source.load().unwrap_err();

    assert_eq!(
        err.user_message(&source.to_string()),
        "Could not load business data. Please ensure '/no/such/data_enriched.json' is present."
    );
}
