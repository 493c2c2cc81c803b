//! Document storage.
//!
//! The service talks to its document store through [`DocumentStore`], which
//! takes a SQL-shaped statement and returns JSON values. The compiler never
//! sees the store and the store never sees request parameters.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: keeps documents in memory and evaluates the statements
//!   the compiler emits. Seeded from a JSON file at startup.
//! - [`TimeoutStore`]: wraps any store and bounds every call with the same
//!   timeout, so all call sites share one timeout policy.
//!
//! # Pagination
//!
//! [`DocumentStore::query_page`] owns paging. The default implementation runs
//! the full query and slices in memory; a store that can push `OFFSET`/`LIMIT`
//! down should override it.

mod memory;
pub mod sql;
mod timeout;

use futures::future::BoxFuture;
use serde_json::{Map, Value};

pub use memory::MemoryStore;
pub use timeout::TimeoutStore;

/// A stored document: a JSON object with insertion-ordered keys.
pub type Document = Map<String, Value>;

/// A window into a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    pub offset: usize,
    /// `None` returns everything after `offset`.
    pub limit: Option<usize>,
}

impl Page {
    /// Apply this window to a fully materialized result set.
    #[must_use]
    pub fn slice(self, results: Vec<Value>) -> PageResult {
        let total = results.len();
        let items = results
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();
        PageResult { items, total }
    }
}

/// One page of results plus the size of the unpaged result set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageResult {
    pub items: Vec<Value>,
    pub total: usize,
}

/// The storage collaborator.
///
/// Futures are boxed so stores can be shared as `Arc<dyn DocumentStore>`.
pub trait DocumentStore: Send + Sync {
    /// Run a statement and return every result.
    fn query<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, Result<Vec<Value>, StorageError>>;

    /// Run a statement and return one page of its results.
    fn query_page<'a>(
        &'a self,
        sql: &'a str,
        page: Page,
    ) -> BoxFuture<'a, Result<PageResult, StorageError>> {
        Box::pin(async move {
            let results = self.query(sql).await?;
            Ok(page.slice(results))
        })
    }

    /// Persist documents.
    fn insert(&self, documents: Vec<Document>) -> BoxFuture<'_, Result<(), StorageError>>;
}

/// Errors that can occur during storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// The statement could not be parsed or is not supported.
    InvalidQuery(String),
    /// The store did not answer in time.
    Timeout,
    /// The store's lock is poisoned.
    LockPoisoned,
    /// The seed file could not be read.
    SeedIo(std::io::Error),
    /// The seed file is not a JSON array of objects.
    SeedFormat(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuery(message) => write!(f, "invalid query: {message}"),
            Self::Timeout => write!(f, "storage query timed out"),
            Self::LockPoisoned => write!(f, "storage lock poisoned"),
            Self::SeedIo(e) => write!(f, "failed to read seed file: {e}"),
            Self::SeedFormat(message) => write!(f, "invalid seed file: {message}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SeedIo(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::SeedIo(e)
    }
}
