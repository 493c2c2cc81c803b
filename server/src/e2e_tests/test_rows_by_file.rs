//! Test listing the rows of one import.

use serde_json::json;

use crate::e2e_tests::helpers::*;

#[test]
fn test_rows_by_canonical_file_id() {
    let app = TestApp::new();

    let resp = app.rows(&[("fileId", "import_a1")]);

    assert!(is_ok(&resp));
    assert_eq!(resp.data()["total"], json!(3));
    assert_eq!(resp.column("Region"), vec![json!("EU"), json!("US"), json!("EU")]);
}

#[test]
fn test_rows_by_bare_file_id() {
    let app = TestApp::new();

    let resp = app.rows(&[("fileId", "a1")]);

    assert!(is_ok(&resp));
    assert_eq!(resp.rows().len(), 3);
}

#[test]
fn test_rows_without_file_id_span_every_import() {
    let app = TestApp::new();

    let resp = app.rows(&[]);

    assert!(is_ok(&resp));
    assert_eq!(resp.data()["total"], json!(5));
}

#[test]
fn test_blank_file_id_is_ignored() {
    let app = TestApp::new();

    let resp = app.rows(&[("fileId", "  ")]);

    assert_eq!(resp.data()["total"], json!(5));
}

#[test]
fn test_unknown_file_id_returns_no_rows() {
    let app = TestApp::new();

    let resp = app.rows(&[("fileId", "import_missing")]);

    assert!(is_ok(&resp));
    assert!(resp.rows().is_empty());
    assert_eq!(resp.data()["total"], json!(0));
}

#[test]
fn test_empty_store() {
    let app = TestApp::empty();

    let resp = app.rows(&[]);

    assert!(is_ok(&resp));
    assert!(resp.rows().is_empty());
}
