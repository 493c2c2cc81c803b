//! Test how `fileId` spellings map onto stored import ids.
//!
//! `import_a1` is stored canonically; `import_import_b2` carries the doubled
//! prefix older uploads were written with.

use serde_json::json;

use crate::e2e_tests::helpers::*;

#[test]
fn test_single_prefixed_id_finds_double_prefixed_rows() {
    let app = TestApp::new();

    let resp = app.rows(&[("fileId", "import_b2")]);

    assert!(is_ok(&resp));
    assert_eq!(resp.column("Region"), vec![json!("APAC"), json!("EU")]);
}

#[test]
fn test_double_prefixed_id_only_tries_canonical_form() {
    let app = TestApp::new();

    let resp = app.rows(&[("fileId", "import_import_b2")]);

    assert!(is_ok(&resp));
    assert!(resp.rows().is_empty());
}

#[test]
fn test_double_prefixed_id_finds_canonical_rows() {
    let app = TestApp::new();

    let resp = app.rows(&[("fileId", "import_import_a1")]);

    assert_eq!(resp.rows().len(), 3);
}

#[test]
fn test_bare_id_only_tries_canonical_form() {
    let app = TestApp::new();

    assert_eq!(app.rows(&[("fileId", "a1")]).rows().len(), 3);
    assert!(app.rows(&[("fileId", "b2")]).rows().is_empty());
}

#[test]
fn test_quote_in_file_id_is_escaped() {
    let app = TestApp::new();

    let resp = app.rows(&[("fileId", "a1' OR c.documentType = 'excel-row")]);

    assert!(is_ok(&resp));
    assert!(resp.rows().is_empty());
}

#[test]
fn test_get_import_normalizes_id() {
    let app = TestApp::new();

    let resp = app.import("import_b2", &[]);
    assert!(is_ok(&resp));
    assert_eq!(resp.data()["id"], json!("import_import_b2"));

    let resp = app.import("a1", &[]);
    assert_eq!(resp.data()["fileName"], json!("sales-2020.xlsx"));
}
