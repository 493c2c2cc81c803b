//! Test distinct value extraction for filter pickers.

use axum::http::StatusCode;
use serde_json::json;

use crate::e2e_tests::helpers::*;

#[test]
fn test_distinct_values_per_field() {
    let app = TestApp::new();

    let resp = app.distinct(&[("fields", "Region,Category")]);

    assert!(is_ok(&resp));
    assert_eq!(
        resp.data(),
        &json!({
            "Region": ["EU", "US", "APAC"],
            "Category": ["Hardware", "Software", "Services"],
        })
    );
}

#[test]
fn test_year_values_are_coerced_to_numbers() {
    let app = TestApp::new();

    let resp = app.distinct(&[("fields", "Year")]);

    assert_eq!(resp.data(), &json!({"Year": [2020, 2021, 2019]}));
}

#[test]
fn test_distinct_values_respect_filters() {
    let app = TestApp::new();

    let resp = app.distinct(&[("fields", "Category"), ("Region", "EU")]);

    assert_eq!(
        resp.data(),
        &json!({"Category": ["Hardware", "Software", "Services"]})
    );

    let resp = app.distinct(&[("fields", "Category"), ("fileId", "import_a1"), ("Region", "EU")]);

    assert_eq!(resp.data(), &json!({"Category": ["Hardware", "Software"]}));
}

#[test]
fn test_undefined_field_yields_empty_list() {
    let app = TestApp::new();

    let resp = app.distinct(&[("fields", "Amount,Owner")]);

    assert_eq!(resp.data(), &json!({"Amount": [100, 250, 75], "Owner": []}));
}

#[test]
fn test_repeated_field_is_extracted_once() {
    let app = TestApp::new();

    let resp = app.distinct(&[("fields", "Region"), ("fields", "Region")]);

    assert_eq!(resp.data().as_object().map(serde_json::Map::len), Some(1));
}

#[test]
fn test_missing_fields_parameter_is_rejected() {
    let app = TestApp::new();

    let resp = app.distinct(&[("Region", "EU")]);

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(!resp.body["success"].as_bool().unwrap_or(true));
}
