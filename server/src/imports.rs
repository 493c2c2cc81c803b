//! Import records and ingestion.
//!
//! An import is one uploaded sheet: a metadata document of kind
//! [`DocumentKind::Import`] plus one [`DocumentKind::Row`] document per row,
//! all sharing the import id as their partition key.
//!
//! # Invariants
//!
//! - Generated import ids carry the `import_` prefix exactly once.
//! - Incoming rows are stripped of internal keys before system attributes are
//!   added, so a row can never override `id`, `documentType` or `_partitionKey`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::{
    DocumentKind, IMPORT_PREFIX, PARTITION_KEY_FIELD, is_internal_key, sanitize_document,
};
use crate::storage::Document;

/// Metadata describing one import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub id: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    #[serde(default)]
    pub row_count: u64,
    /// Unix time in milliseconds.
    #[serde(default)]
    pub uploaded_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
}

impl ImportRecord {
    /// Parse import documents returned by the store, skipping malformed ones.
    #[must_use]
    pub fn from_results(results: Vec<Value>) -> Vec<Self> {
        results
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Self>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("skipping malformed import record: {e}");
                    None
                }
            })
            .collect()
    }

    /// The stored form of this record.
    fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert("id".to_string(), Value::String(self.id.clone()));
        document.insert(
            "documentType".to_string(),
            Value::String(DocumentKind::Import.as_str().to_string()),
        );
        document.insert(
            PARTITION_KEY_FIELD.to_string(),
            Value::String(self.id.clone()),
        );
        if let Ok(Value::Object(fields)) = serde_json::to_value(self) {
            for (key, value) in fields {
                if !is_internal_key(&key) {
                    document.insert(key, value);
                }
            }
        }
        document
    }
}

/// An ingestion request: already-parsed sheet rows.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewImport {
    pub file_name: String,
    #[serde(default)]
    pub sheet_name: Option<String>,
    pub rows: Vec<Document>,
}

/// Error returned when an ingestion request is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The file name is empty.
    EmptyFileName,
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFileName => write!(f, "fileName must not be empty"),
        }
    }
}

impl std::error::Error for ImportError {}

/// Everything that has to be written for one import.
#[derive(Debug)]
pub struct ImportBatch {
    pub record: ImportRecord,
    /// The metadata document followed by one document per row.
    pub documents: Vec<Document>,
}

/// Generate a fresh import id.
#[must_use]
pub fn new_import_id() -> String {
    format!("{IMPORT_PREFIX}{:016x}", rand::random::<u64>())
}

/// Current Unix time in milliseconds.
#[must_use]
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Turn an ingestion request into the documents to store.
pub fn build_import(
    request: NewImport,
    import_id: String,
    uploaded_by: Option<String>,
    uploaded_at: u64,
) -> Result<ImportBatch, ImportError> {
    let file_name = request.file_name.trim().to_string();
    if file_name.is_empty() {
        return Err(ImportError::EmptyFileName);
    }

    let record = ImportRecord {
        id: import_id,
        file_name,
        sheet_name: request.sheet_name.filter(|s| !s.trim().is_empty()),
        row_count: request.rows.len() as u64,
        uploaded_at,
        uploaded_by,
    };

    let mut documents = Vec::with_capacity(request.rows.len() + 1);
    documents.push(record.to_document());
    for (index, row) in request.rows.iter().enumerate() {
        let mut document = Document::new();
        document.insert(
            "id".to_string(),
            Value::String(format!("{}_{index}", record.id)),
        );
        document.insert(
            "documentType".to_string(),
            Value::String(DocumentKind::Row.as_str().to_string()),
        );
        document.insert(
            PARTITION_KEY_FIELD.to_string(),
            Value::String(record.id.clone()),
        );
        document.extend(sanitize_document(row));
        documents.push(document);
    }

    Ok(ImportBatch { record, documents })
}
