//! Test that internal keys never reach the client.

use crate::e2e_tests::helpers::*;
use crate::filter::is_internal_key;

#[test]
fn test_rows_have_no_internal_keys() {
    let app = TestApp::new();

    let resp = app.rows(&[]);

    for row in resp.rows() {
        let keys: Vec<&String> = row.as_object().map(|o| o.keys().collect()).unwrap_or_default();
        assert!(!keys.is_empty());
        assert!(
            keys.iter().all(|key| !is_internal_key(key)),
            "internal key leaked in {row}"
        );
    }
}

#[test]
fn test_row_keys_keep_their_order() {
    let app = TestApp::new();

    let resp = app.rows(&[("fileId", "import_a1"), ("limit", "1")]);

    let keys: Vec<String> = resp.rows()[0]
        .as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default();
    assert_eq!(keys, vec!["Region", "Year", "Category", "Amount"]);
}
