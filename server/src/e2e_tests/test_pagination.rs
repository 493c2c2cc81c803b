//! Test `limit` and `offset` on listings.

use axum::http::StatusCode;
use serde_json::json;

use crate::e2e_tests::helpers::*;

#[test]
fn test_limit_and_offset() {
    let app = TestApp::new();

    let resp = app.rows(&[("Region", "EU"), ("offset", "1"), ("limit", "1")]);

    assert!(is_ok(&resp));
    assert_eq!(resp.data()["total"], json!(3));
    assert_eq!(resp.data()["offset"], json!(1));
    assert_eq!(resp.data()["limit"], json!(1));
    assert_eq!(resp.column("Year"), vec![json!(2021)]);
}

#[test]
fn test_offset_past_the_end() {
    let app = TestApp::new();

    let resp = app.rows(&[("offset", "50")]);

    assert!(is_ok(&resp));
    assert!(resp.rows().is_empty());
    assert_eq!(resp.data()["total"], json!(5));
}

#[test]
fn test_no_limit_returns_everything() {
    let app = TestApp::new();

    let resp = app.rows(&[]);

    assert_eq!(resp.rows().len(), 5);
    assert!(resp.data().get("limit").is_none());
}

#[test]
fn test_invalid_limit_is_rejected() {
    let app = TestApp::new();

    let resp = app.rows(&[("limit", "ten")]);

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.error(),
        Some("'limit' must be a non-negative integer, got 'ten'")
    );
}

#[test]
fn test_paging_parameters_are_not_filters() {
    let app = TestApp::new();

    let resp = app.imports(&[("limit", "1")]);

    assert!(is_ok(&resp));
    assert_eq!(resp.data().as_array().map(Vec::len), Some(1));
}
