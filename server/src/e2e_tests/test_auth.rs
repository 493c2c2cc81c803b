//! Test token verification on every endpoint.

use axum::http::StatusCode;
use serde_json::json;

use crate::auth::jwt::test_tokens::expired_hs256_token;
use crate::e2e_tests::helpers::*;

#[test]
fn test_missing_token_is_rejected() {
    let app = TestApp::with_auth();

    let resp = app.rows(&[("fileId", "import_a1")]);

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error(), Some("missing token"));
}

#[test]
fn test_valid_token_is_accepted() {
    let app = TestApp::with_auth();
    let token = token("alice");

    let resp = app.rows(&[("fileId", "import_a1"), ("token", token.as_str())]);

    assert!(is_ok(&resp));
    assert_eq!(resp.rows().len(), 3);
}

#[test]
fn test_token_is_not_a_filter() {
    let app = TestApp::with_auth();
    let token = token("alice");

    let resp = app.distinct(&[("fields", "Region"), ("token", token.as_str())]);

    assert_eq!(resp.data(), &json!({"Region": ["EU", "US", "APAC"]}));
}

#[test]
fn test_expired_token_is_rejected() {
    let app = TestApp::with_auth();
    let token = expired_hs256_token("alice", SECRET);

    let resp = app.files(&[("token", token.as_str())]);

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[test]
fn test_token_signed_with_other_key_is_rejected() {
    let app = TestApp::with_auth();
    let token = crate::auth::jwt::test_tokens::hs256_token("alice", b"another-secret");

    let resp = app.imports(&[("token", token.as_str())]);

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[test]
fn test_every_endpoint_requires_a_token() {
    let app = TestApp::with_auth();

    assert_eq!(app.rows(&[]).status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.distinct(&[("fields", "Region")]).status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.files(&[]).status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.imports(&[]).status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.import("import_a1", &[]).status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.create_import(json!({"fileName": "x.xlsx", "rows": []}), &[]).status,
        StatusCode::UNAUTHORIZED
    );
}

#[test]
fn test_uploader_is_token_subject() {
    let app = TestApp::with_auth();
    let token = token("bob");

    let resp = app.create_import(
        json!({"fileName": "x.xlsx", "rows": [{"A": 1}]}),
        &[("token", token.as_str())],
    );

    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.data()["uploadedBy"], json!("bob"));
}
