//! Test requests carrying a very large number of filter fields.

use serde_json::json;

use crate::e2e_tests::helpers::*;

const FIELD_COUNT: usize = 25_000;

fn many_fields() -> Vec<(String, String)> {
    (0..FIELD_COUNT)
        .map(|i| (format!("f{i}"), "x".to_string()))
        .collect()
}

fn as_refs(pairs: &[(String, String)]) -> Vec<(&str, &str)> {
    pairs
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect()
}

#[test]
fn test_thousands_of_filter_fields() {
    let app = TestApp::new();
    let pairs = many_fields();

    let resp = app.rows(&as_refs(&pairs));

    assert!(is_ok(&resp));
    assert!(resp.rows().is_empty());
    assert_eq!(resp.data()["total"], json!(0));
}

#[test]
fn test_thousands_of_values_for_one_field() {
    let app = TestApp::new();
    let mut pairs: Vec<(String, String)> = (0..FIELD_COUNT)
        .map(|i| ("Region".to_string(), format!("R{i}")))
        .collect();
    pairs.push(("Region".to_string(), "APAC".to_string()));

    let resp = app.rows(&as_refs(&pairs));

    assert!(is_ok(&resp));
    assert_eq!(resp.column("Region"), vec![json!("APAC")]);
}

#[test]
fn test_thousands_of_filter_fields_on_distinct_and_files() {
    let app = TestApp::new();
    let mut pairs = many_fields();
    pairs.push(("fields".to_string(), "Region".to_string()));

    let resp = app.distinct(&as_refs(&pairs));
    assert!(is_ok(&resp));
    assert_eq!(resp.data(), &json!({"Region": []}));

    let resp = app.files(&as_refs(&pairs));
    assert!(is_ok(&resp));
    assert_eq!(resp.data(), &json!([]));
}
