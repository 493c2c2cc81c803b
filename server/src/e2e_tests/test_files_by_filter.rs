//! Test finding the imports that contain matching rows.

use serde_json::json;

use crate::e2e_tests::helpers::*;

fn file_names(resp: &TestResponse) -> Vec<String> {
    resp.data()
        .as_array()
        .map(|records| {
            records
                .iter()
                .filter_map(|record| record["fileName"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_files_matching_filter() {
    let app = TestApp::new();

    let resp = app.files(&[("Region", "EU")]);

    assert!(is_ok(&resp));
    assert_eq!(file_names(&resp), vec!["sales-2020.xlsx", "legacy.xlsx"]);
}

#[test]
fn test_files_found_through_double_prefixed_partition_key() {
    let app = TestApp::new();

    let resp = app.files(&[("Category", "Services")]);

    assert_eq!(
        resp.data(),
        &json!([{
            "id": "import_import_b2",
            "fileName": "legacy.xlsx",
            "rowCount": 2,
            "uploadedAt": 1_500_000_000_000_u64,
        }])
    );
}

#[test]
fn test_files_record_shape() {
    let app = TestApp::new();

    let resp = app.files(&[("Region", "US")]);

    assert_eq!(
        resp.data(),
        &json!([{
            "id": "import_a1",
            "fileName": "sales-2020.xlsx",
            "sheetName": "Sheet1",
            "rowCount": 3,
            "uploadedAt": 1_600_000_000_000_u64,
            "uploadedBy": "alice",
        }])
    );
}

#[test]
fn test_no_matching_rows_returns_no_files() {
    let app = TestApp::new();

    let resp = app.files(&[("Region", "Antarctica")]);

    assert!(is_ok(&resp));
    assert_eq!(resp.data(), &json!([]));
}

#[test]
fn test_files_without_filters_lists_every_import_with_rows() {
    let app = TestApp::new();

    let resp = app.files(&[]);

    assert_eq!(file_names(&resp).len(), 2);
}
