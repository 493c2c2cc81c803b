//! Common helpers for end-to-end tests.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::auth::jwt::test_tokens::hs256_token;
use crate::auth::{JwtConfig, TokenVerifier};
use crate::filter::FieldTypeRegistry;
use crate::http::{ApiError, ApiResponse, AppState, files, imports, rows};
use crate::imports::NewImport;
use crate::storage::{DocumentStore, MemoryStore};
use crate::testing::fixture_store;

pub const SECRET: &[u8] = b"e2e-test-secret";

/// A handler response: status plus the serialized envelope.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn error(&self) -> Option<&str> {
        self.body["error"].as_str()
    }

    /// The `rows` array of a rows page.
    #[allow(clippy::expect_used)]
    pub fn rows(&self) -> &Vec<Value> {
        self.data()["rows"].as_array().expect("rows array")
    }

    /// Rows projected onto one field, in result order.
    pub fn column(&self, field: &str) -> Vec<Value> {
        self.rows().iter().map(|row| row[field].clone()).collect()
    }
}

fn respond<T: Serialize>(result: Result<Json<ApiResponse<T>>, ApiError>) -> TestResponse {
    match result {
        Ok(Json(envelope)) => TestResponse {
            status: StatusCode::OK,
            body: to_value(&envelope),
        },
        Err(error) => TestResponse {
            status: error.status,
            body: to_value(&ApiResponse::failure(error.message)),
        },
    }
}

#[allow(clippy::expect_used)]
fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("serializable response")
}

fn query(params: &[(&str, &str)]) -> Query<Vec<(String, String)>> {
    Query(
        params
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect(),
    )
}

/// The application state plus a runtime to drive handlers on.
pub struct TestApp {
    pub state: AppState,
    pub runtime: tokio::runtime::Runtime,
}

impl TestApp {
    /// An unauthenticated app over the fixture store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(fixture_store(), None)
    }

    /// An unauthenticated app over an empty store.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_store(MemoryStore::new(), None)
    }

    /// An app over the fixture store that requires HS256 tokens signed with
    /// [`SECRET`].
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn with_auth() -> Self {
        let verifier = TokenVerifier::new(&JwtConfig::Hs256 {
            secret: SECRET.to_vec(),
        })
        .expect("verifier");
        Self::with_store(fixture_store(), Some(verifier))
    }

    #[allow(clippy::expect_used)]
    fn with_store(store: MemoryStore, verifier: Option<TokenVerifier>) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(store);
        let state = AppState::new(store, FieldTypeRegistry::new(), verifier);
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create runtime");
        Self { state, runtime }
    }

    pub fn rows(&self, params: &[(&str, &str)]) -> TestResponse {
        respond(
            self.runtime
                .block_on(rows::list_rows(State(self.state.clone()), query(params))),
        )
    }

    pub fn distinct(&self, params: &[(&str, &str)]) -> TestResponse {
        respond(
            self.runtime
                .block_on(rows::distinct_values(State(self.state.clone()), query(params))),
        )
    }

    pub fn files(&self, params: &[(&str, &str)]) -> TestResponse {
        respond(
            self.runtime
                .block_on(files::files_by_filter(State(self.state.clone()), query(params))),
        )
    }

    pub fn imports(&self, params: &[(&str, &str)]) -> TestResponse {
        respond(
            self.runtime
                .block_on(imports::list_imports(State(self.state.clone()), query(params))),
        )
    }

    pub fn import(&self, id: &str, params: &[(&str, &str)]) -> TestResponse {
        respond(self.runtime.block_on(imports::get_import(
            State(self.state.clone()),
            Path(id.to_string()),
            query(params),
        )))
    }

    #[allow(clippy::expect_used)]
    pub fn create_import(&self, body: Value, params: &[(&str, &str)]) -> TestResponse {
        let request: NewImport = serde_json::from_value(body).expect("valid request body");
        let result = self.runtime.block_on(imports::create_import(
            State(self.state.clone()),
            query(params),
            Ok(Json(request)),
        ));
        match result {
            Ok((status, Json(envelope))) => TestResponse {
                status,
                body: to_value(&envelope),
            },
            Err(error) => TestResponse {
                status: error.status,
                body: to_value(&ApiResponse::failure(error.message)),
            },
        }
    }
}

/// Check if a response succeeded.
pub fn is_ok(resp: &TestResponse) -> bool {
    resp.status.is_success() && resp.body["success"] == Value::Bool(true)
}

/// A valid token for `subject`.
pub fn token(subject: &str) -> String {
    hs256_token(subject, SECRET)
}
