//! In-memory document store.

use std::path::Path;
use std::sync::RwLock;

use futures::future::BoxFuture;
use serde_json::Value;

use super::sql::Statement;
use super::{Document, DocumentStore, StorageError};

/// Documents held in memory, queried with the compiler's statement dialect.
///
/// # Thread Safety
///
/// Queries take a read lock and inserts a write lock; neither is held across
/// an await point.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given documents.
    #[must_use]
    pub const fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Load a store from a JSON file containing an array of objects.
    pub fn from_seed_file(path: &Path) -> Result<Self, StorageError> {
        let bytes = std::fs::read(path)?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::SeedFormat(e.to_string()))?;
        let Value::Array(items) = value else {
            return Err(StorageError::SeedFormat(
                "expected a JSON array of documents".to_string(),
            ));
        };

        let mut documents = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match item {
                Value::Object(document) => documents.push(document),
                _ => {
                    return Err(StorageError::SeedFormat(format!(
                        "item {index} is not a JSON object"
                    )));
                }
            }
        }

        tracing::info!(
            "Loaded {} documents from seed file {}",
            documents.len(),
            path.display()
        );
        Ok(Self::with_documents(documents))
    }

    /// Number of stored documents.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self
            .documents
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    fn execute(&self, sql: &str) -> Result<Vec<Value>, StorageError> {
        let statement = Statement::parse(sql)?;
        let documents = self
            .documents
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(statement.execute(documents.iter()))
    }
}

impl DocumentStore for MemoryStore {
    fn query<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, Result<Vec<Value>, StorageError>> {
        Box::pin(async move {
            let results = self.execute(sql)?;
            tracing::debug!(results = results.len(), sql, "memory store query");
            Ok(results)
        })
    }

    fn insert(&self, documents: Vec<Document>) -> BoxFuture<'_, Result<(), StorageError>> {
        Box::pin(async move {
            let count = documents.len();
            self.documents
                .write()
                .map_err(|_| StorageError::LockPoisoned)?
                .extend(documents);
            tracing::debug!(count, "memory store insert");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::storage::Page;
    use serde_json::json;

    fn object(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::with_documents(vec![
            object(json!({"id": "1", "documentType": "excel-row", "n": 1})),
            object(json!({"id": "2", "documentType": "excel-row", "n": 2})),
            object(json!({"id": "3", "documentType": "excel-row", "n": 3})),
        ])
    }

    #[tokio::test]
    async fn test_query() {
        let results = store()
            .query("SELECT * FROM c WHERE c.n IN (1,3)")
            .await
            .expect("query");
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_query_page_uses_default_slicing() {
        let page = store()
            .query_page(
                "SELECT VALUE c.n FROM c",
                Page {
                    offset: 1,
                    limit: Some(1),
                },
            )
            .await
            .expect("query");
        assert_eq!(page.items, vec![json!(2)]);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_insert_then_query() {
        let store = MemoryStore::new();
        assert!(store.is_empty().expect("len"));
        store
            .insert(vec![object(json!({"id": "a", "documentType": "excel-import"}))])
            .await
            .expect("insert");
        assert_eq!(store.len().expect("len"), 1);
        let results = store
            .query("SELECT * FROM c WHERE c.documentType = 'excel-import'")
            .await
            .expect("query");
        assert_eq!(results, vec![json!({"id": "a", "documentType": "excel-import"})]);
    }

    #[tokio::test]
    async fn test_invalid_query_is_an_error() {
        let result = store().query("SELECT nonsense").await;
        assert!(matches!(result, Err(StorageError::InvalidQuery(_))));
    }

    #[test]
    fn test_from_seed_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"[{{"id": "1", "Name": "Ann"}}, {{"id": "2"}}]"#).expect("write");
        let store = MemoryStore::from_seed_file(file.path()).expect("load");
        assert_eq!(store.len().expect("len"), 2);
    }

    #[test]
    fn test_seed_file_must_be_array_of_objects() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"[{{"id": "1"}}, 2]"#).expect("write");
        let result = MemoryStore::from_seed_file(file.path());
        assert!(matches!(
            result,
            Err(StorageError::SeedFormat(message)) if message.contains("item 1")
        ));

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"id": "1"}}"#).expect("write");
        assert!(matches!(
            MemoryStore::from_seed_file(file.path()),
            Err(StorageError::SeedFormat(_))
        ));
    }

    #[test]
    fn test_missing_seed_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = MemoryStore::from_seed_file(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(StorageError::SeedIo(_))));
    }
}
