//! Test ingesting a sheet and reading it back.

use axum::http::StatusCode;
use serde_json::json;

use crate::e2e_tests::helpers::*;

fn upload() -> serde_json::Value {
    json!({
        "fileName": "budget.xlsx",
        "sheetName": "2024",
        "rows": [
            {"Department": "Ops", "Fiscal Year": 2024, "Budget": 1200},
            {"Department": "R&D", "Fiscal Year": "2024", "Budget": 3400, "_rid": "client"},
        ],
    })
}

#[allow(clippy::expect_used)]
fn created_id(resp: &TestResponse) -> String {
    resp.data()["id"].as_str().expect("import id").to_string()
}

#[test]
fn test_create_import() {
    let app = TestApp::empty();

    let resp = app.create_import(upload(), &[]);

    assert_eq!(resp.status, StatusCode::CREATED);
    assert!(is_ok(&resp));
    let id = created_id(&resp);
    assert!(id.starts_with("import_"));
    assert!(!id.starts_with("import_import_"));
    assert_eq!(resp.data()["fileName"], json!("budget.xlsx"));
    assert_eq!(resp.data()["rowCount"], json!(2));
    assert!(resp.data().get("uploadedBy").is_none());
}

#[test]
fn test_ingested_rows_are_queryable() {
    let app = TestApp::empty();
    let id = created_id(&app.create_import(upload(), &[]));

    let resp = app.rows(&[("fileId", id.as_str())]);
    assert_eq!(
        resp.rows(),
        &vec![
            json!({"Department": "Ops", "Fiscal Year": 2024, "Budget": 1200}),
            json!({"Department": "R&D", "Fiscal Year": "2024", "Budget": 3400}),
        ]
    );

    let resp = app.rows(&[("Department", "R&D")]);
    assert_eq!(resp.rows().len(), 1);

    let resp = app.distinct(&[("fileId", id.as_str()), ("fields", "Fiscal Year")]);
    assert_eq!(resp.data(), &json!({"Fiscal Year": [2024]}));
}

#[test]
fn test_ingested_import_is_listed() {
    let app = TestApp::new();
    let id = created_id(&app.create_import(upload(), &[]));

    let resp = app.imports(&[]);
    assert_eq!(resp.data().as_array().map(Vec::len), Some(3));

    let resp = app.import(&id, &[]);
    assert!(is_ok(&resp));
    assert_eq!(resp.data()["sheetName"], json!("2024"));

    let resp = app.files(&[("Department", "Ops")]);
    assert_eq!(resp.data()[0]["id"], json!(id));
}

#[test]
fn test_empty_file_name_is_rejected() {
    let app = TestApp::empty();

    let resp = app.create_import(json!({"fileName": " ", "rows": []}), &[]);

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), Some("fileName must not be empty"));
    assert_eq!(app.imports(&[]).data(), &json!([]));
}

#[test]
fn test_unknown_import_is_not_found() {
    let app = TestApp::new();

    let resp = app.import("import_nope", &[]);

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error(), Some("import 'import_nope' not found"));
}
