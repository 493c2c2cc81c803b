//! Uniform timeout policy for any document store.

use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::Value;

use super::{Document, DocumentStore, Page, PageResult, StorageError};

/// Wraps a store and bounds every call by the same timeout.
#[derive(Debug)]
pub struct TimeoutStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S> TimeoutStore<S> {
    #[must_use]
    pub const fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

async fn bounded<T>(
    timeout: Duration,
    future: BoxFuture<'_, Result<T, StorageError>>,
) -> Result<T, StorageError> {
    tokio::time::timeout(timeout, future).await.map_err(|_| {
        tracing::warn!("storage call exceeded {}ms", timeout.as_millis());
        StorageError::Timeout
    })?
}

impl<S: DocumentStore> DocumentStore for TimeoutStore<S> {
    fn query<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, Result<Vec<Value>, StorageError>> {
        Box::pin(bounded(self.timeout, self.inner.query(sql)))
    }

    fn query_page<'a>(
        &'a self,
        sql: &'a str,
        page: Page,
    ) -> BoxFuture<'a, Result<PageResult, StorageError>> {
        Box::pin(bounded(self.timeout, self.inner.query_page(sql, page)))
    }

    fn insert(&self, documents: Vec<Document>) -> BoxFuture<'_, Result<(), StorageError>> {
        Box::pin(bounded(self.timeout, self.inner.insert(documents)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    /// A store that never answers.
    struct StalledStore;

    impl DocumentStore for StalledStore {
        fn query<'a>(&'a self, _sql: &'a str) -> BoxFuture<'a, Result<Vec<Value>, StorageError>> {
            Box::pin(std::future::pending())
        }

        fn insert(&self, _documents: Vec<Document>) -> BoxFuture<'_, Result<(), StorageError>> {
            Box::pin(std::future::pending())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_times_out() {
        let store = TimeoutStore::new(StalledStore, Duration::from_millis(50));
        let result = store.query("SELECT * FROM c").await;
        assert!(matches!(result, Err(StorageError::Timeout)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_query_page_is_bounded_too() {
        let store = TimeoutStore::new(StalledStore, Duration::from_millis(50));
        let result = store.query_page("SELECT * FROM c", Page::default()).await;
        assert!(matches!(result, Err(StorageError::Timeout)));
    }

    #[tokio::test]
    async fn test_fast_store_passes_through() {
        let store = TimeoutStore::new(MemoryStore::new(), Duration::from_secs(1));
        assert!(store.query("SELECT * FROM c").await.expect("query").is_empty());

        let document = match serde_json::json!({"id": "1"}) {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        };
        store.insert(vec![document]).await.expect("insert");
        assert_eq!(store.query("SELECT * FROM c").await.expect("query").len(), 1);
    }
}
