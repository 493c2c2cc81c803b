//! Shared fixtures for unit and end-to-end tests.
//!
//! Two imports:
//!
//! | Import | Stored id | Rows |
//! |---|---|---|
//! | `sales-2020.xlsx` | `import_a1` | EU/2020, US/2020, EU/2021 |
//! | `legacy.xlsx` | `import_import_b2` | APAC/"2019", EU/2021 |
//!
//! The second import was written with a doubled prefix and stores its year
//! as text, both of which older uploads did.

use serde_json::{Value, json};

use crate::storage::{Document, MemoryStore};

pub const CANONICAL_IMPORT_ID: &str = "import_a1";
pub const LEGACY_IMPORT_ID: &str = "import_import_b2";

fn object(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("fixture documents must be objects"),
    }
}

/// Every fixture document, imports first.
#[must_use]
pub fn fixture_documents() -> Vec<Document> {
    [
        json!({
            "id": CANONICAL_IMPORT_ID,
            "documentType": "excel-import",
            "_partitionKey": CANONICAL_IMPORT_ID,
            "fileName": "sales-2020.xlsx",
            "sheetName": "Sheet1",
            "rowCount": 3,
            "uploadedAt": 1_600_000_000_000_u64,
            "uploadedBy": "alice",
            "_rid": "rid-a1",
        }),
        json!({
            "id": LEGACY_IMPORT_ID,
            "documentType": "excel-import",
            "_partitionKey": LEGACY_IMPORT_ID,
            "fileName": "legacy.xlsx",
            "rowCount": 2,
            "uploadedAt": 1_500_000_000_000_u64,
            "_rid": "rid-b2",
        }),
        json!({
            "id": "import_a1_0",
            "documentType": "excel-row",
            "_partitionKey": CANONICAL_IMPORT_ID,
            "Region": "EU",
            "Year": 2020,
            "Category": "Hardware",
            "Amount": 100,
            "_rid": "rid-a1-0",
            "_etag": "etag-a1-0",
        }),
        json!({
            "id": "import_a1_1",
            "documentType": "excel-row",
            "_partitionKey": CANONICAL_IMPORT_ID,
            "Region": "US",
            "Year": 2020,
            "Category": "Software",
            "Amount": 250,
            "_rid": "rid-a1-1",
        }),
        json!({
            "id": "import_a1_2",
            "documentType": "excel-row",
            "_partitionKey": CANONICAL_IMPORT_ID,
            "Region": "EU",
            "Year": 2021,
            "Category": "Software",
            "Amount": 75,
            "_rid": "rid-a1-2",
        }),
        json!({
            "id": "import_import_b2_0",
            "documentType": "excel-row",
            "_partitionKey": LEGACY_IMPORT_ID,
            "Region": "APAC",
            "Year": "2019",
            "Category": "Hardware",
            "_rid": "rid-b2-0",
        }),
        json!({
            "id": "import_import_b2_1",
            "documentType": "excel-row",
            "_partitionKey": LEGACY_IMPORT_ID,
            "Region": "EU",
            "Year": 2021,
            "Category": "Services",
            "_rid": "rid-b2-1",
        }),
    ]
    .into_iter()
    .map(object)
    .collect()
}

/// A store holding [`fixture_documents`].
#[must_use]
pub fn fixture_store() -> MemoryStore {
    MemoryStore::with_documents(fixture_documents())
}
