//! Test field filters on the row listing.

use serde_json::json;

use crate::e2e_tests::helpers::*;

#[test]
fn test_single_value_filter() {
    let app = TestApp::new();

    let resp = app.rows(&[("Region", "EU")]);

    assert!(is_ok(&resp));
    assert_eq!(resp.column("Region"), vec![json!("EU"); 3]);
}

#[test]
fn test_filters_are_anded() {
    let app = TestApp::new();

    let resp = app.rows(&[("Region", "EU"), ("Category", "Software")]);

    assert_eq!(resp.rows().len(), 1);
    assert_eq!(resp.rows()[0]["Amount"], json!(75));
}

#[test]
fn test_filters_combine_with_file_id() {
    let app = TestApp::new();

    let resp = app.rows(&[("fileId", "import_a1"), ("Year", "2021")]);

    assert_eq!(resp.column("Category"), vec![json!("Software")]);
}

#[test]
fn test_repeated_parameter_is_multi_valued() {
    let app = TestApp::new();

    let resp = app.rows(&[("Region", "US"), ("Region", "APAC")]);

    assert_eq!(resp.column("Region"), vec![json!("US"), json!("APAC")]);
}

#[test]
fn test_comma_separated_value_is_multi_valued() {
    let app = TestApp::new();

    let resp = app.rows(&[("Category", "Services, Software")]);

    assert_eq!(
        resp.column("Category"),
        vec![json!("Software"), json!("Software"), json!("Services")]
    );
}

#[test]
fn test_year_filter_compares_numbers() {
    let app = TestApp::new();

    let resp = app.rows(&[("Year", "2020")]);

    assert_eq!(resp.column("Year"), vec![json!(2020), json!(2020)]);
}

#[test]
fn test_non_numeric_year_is_compared_as_text() {
    let app = TestApp::new();

    let resp = app.rows(&[("Year", "unknown")]);

    assert!(is_ok(&resp));
    assert!(resp.rows().is_empty());
}

#[test]
fn test_blank_filter_is_ignored() {
    let app = TestApp::new();

    let resp = app.rows(&[("Region", ""), ("Category", " , ")]);

    assert_eq!(resp.data()["total"], json!(5));
}

#[test]
fn test_quote_in_value_is_escaped() {
    let app = TestApp::new();

    let resp = app.rows(&[("Region", "EU' OR '1'='1")]);

    assert!(is_ok(&resp));
    assert!(resp.rows().is_empty());
}

#[test]
fn test_unsafe_field_name_is_sanitized() {
    let app = TestApp::new();

    let resp = app.rows(&[("Region\"] OR 1=1 --", "EU")]);

    assert!(is_ok(&resp));
    assert!(resp.rows().is_empty());
}
