//! Result document sanitization.
//!
//! Stored documents carry store metadata (`_rid`, `_etag`, ...), our own
//! routing attribute (`_partitionKey`), the document `id` and the
//! `documentType` discriminator. None of these belong to the client.

use serde_json::Value;

use super::compiler::DOCUMENT_TYPE_FIELD;
use crate::storage::Document;

/// Returns true if `key` is internal and must not leave the service.
#[must_use]
pub fn is_internal_key(key: &str) -> bool {
    key.starts_with('_') || key == "id" || key == DOCUMENT_TYPE_FIELD
}

/// Copy a document without its internal keys, preserving key order.
#[must_use]
pub fn sanitize_document(document: &Document) -> Document {
    document
        .iter()
        .filter(|(key, _)| !is_internal_key(key))
        .map(|(key, value)| (key.to_owned(), value.clone()))
        .collect()
}

/// Sanitize every object in a result set. Non-object values pass through.
#[must_use]
pub fn sanitize_results(results: Vec<Value>) -> Vec<Value> {
    results
        .into_iter()
        .map(|value| match value {
            Value::Object(document) => Value::Object(sanitize_document(&document)),
            other => other,
        })
        .collect()
}
