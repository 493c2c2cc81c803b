//! HTTP route layer.
//!
//! Handlers are thin: they authenticate, fold the query string into
//! [`QueryParams`], hand it to the filter compiler, run the resulting
//! statements against the store and wrap the answer in [`ApiResponse`].
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /healthz` | [`healthz`] |
//! | `GET /api/rows` | [`rows::list_rows`] |
//! | `GET /api/rows/distinct` | [`rows::distinct_values`] |
//! | `GET /api/files` | [`files::files_by_filter`] |
//! | `GET /api/imports` | [`imports::list_imports`] |
//! | `POST /api/imports` | [`imports::create_import`] |
//! | `GET /api/imports/{id}` | [`imports::get_import`] |

pub mod files;
pub mod imports;
pub mod rows;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::auth::{AuthError, Principal, TokenVerifier, authenticate};
use crate::filter::{
    CompiledPredicate, DistinctError, DocumentKind, FieldTypeRegistry, ImportIdCandidates,
    QueryParams, ReservedParameters, build_filter_clauses, compile, normalize_import_id,
};
use crate::storage::{DocumentStore, Page, StorageError};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub field_types: Arc<FieldTypeRegistry>,
    /// `None` disables authentication.
    pub verifier: Option<Arc<TokenVerifier>>,
    pub reserved: Arc<ReservedParameters>,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        field_types: FieldTypeRegistry,
        verifier: Option<TokenVerifier>,
    ) -> Self {
        Self {
            store,
            field_types: Arc::new(field_types),
            verifier: verifier.map(Arc::new),
            reserved: Arc::new(ReservedParameters::default()),
        }
    }

    /// Authenticate a request from its `token` parameter.
    pub(crate) fn authenticate(&self, params: &QueryParams) -> Result<Option<Principal>, ApiError> {
        authenticate(self.verifier.as_deref(), params.first_non_blank("token"))
            .map_err(ApiError::from)
    }

    /// Compile the row predicate for a request: `fileId` scopes it to one
    /// import, every other non-reserved parameter becomes a clause.
    pub(crate) fn row_predicate(&self, params: &QueryParams) -> CompiledPredicate {
        let clauses = build_filter_clauses(params, &self.reserved, &self.field_types);
        let candidates = params.first_non_blank("fileId").map(normalize_import_id);
        compile(
            DocumentKind::Row,
            candidates.as_ref().map(ImportIdCandidates::as_slice),
            &clauses,
        )
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/rows", get(rows::list_rows))
        .route("/api/rows/distinct", get(rows::distinct_values))
        .route("/api/files", get(files::files_by_filter))
        .route(
            "/api/imports",
            get(imports::list_imports).post(imports::create_import),
        )
        .route("/api/imports/{id}", get(imports::get_import))
        .with_state(state)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Health {
    pub status: &'static str,
}

pub async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub const fn failure(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Handler result type.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// An error response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::failure(self.message))).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        tracing::error!("storage query failed: {e}");
        let status = match e {
            StorageError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<DistinctError> for ApiError {
    fn from(e: DistinctError) -> Self {
        let message = e.to_string();
        Self {
            message,
            ..Self::from(e.source)
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        tracing::debug!("rejected request: {e}");
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: e.to_string(),
        }
    }
}

/// Read `limit` and `offset`. Both are optional; no implicit cap is applied.
pub(crate) fn parse_page(params: &QueryParams) -> Result<Page, ApiError> {
    let parse = |name: &str| -> Result<Option<usize>, ApiError> {
        params
            .first_non_blank(name)
            .map(|value| {
                value.parse::<usize>().map_err(|_| {
                    ApiError::bad_request(format!(
                        "'{name}' must be a non-negative integer, got '{value}'"
                    ))
                })
            })
            .transpose()
    };

    Ok(Page {
        offset: parse("offset")?.unwrap_or(0),
        limit: parse("limit")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(raw: &[(&str, &str)]) -> QueryParams {
        QueryParams::from_pairs(raw.iter().map(|(n, v)| ((*n).to_string(), (*v).to_string())))
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(&params(&[])).expect("page"), Page::default());
        assert_eq!(
            parse_page(&params(&[("limit", "10"), ("offset", "20")])).expect("page"),
            Page {
                offset: 20,
                limit: Some(10),
            }
        );
        assert_eq!(
            parse_page(&params(&[("limit", "")])).expect("page"),
            Page::default()
        );
    }

    #[test]
    fn test_parse_page_rejects_garbage() {
        let error = parse_page(&params(&[("limit", "-1")])).expect_err("invalid");
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.message, "'limit' must be a non-negative integer, got '-1'");
    }

    #[test]
    fn test_storage_error_status() {
        assert_eq!(
            ApiError::from(StorageError::Timeout).status,
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(StorageError::InvalidQuery("x".to_string())).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_distinct_error_keeps_storage_status() {
        let error = ApiError::from(DistinctError {
            field: "Year".to_string(),
            source: StorageError::Timeout,
        });
        assert_eq!(error.status, StatusCode::GATEWAY_TIMEOUT);
        assert!(error.message.contains("'Year'"));
    }

    #[test]
    fn test_auth_error_is_unauthorized() {
        assert_eq!(
            ApiError::from(AuthError::MissingToken).status,
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_failure_envelope_serialization() {
        let body = serde_json::to_value(ApiResponse::failure("boom".to_string())).expect("json");
        assert_eq!(body, serde_json::json!({"success": false, "error": "boom"}));
        let body = serde_json::to_value(ApiResponse::ok(vec![1])).expect("json");
        assert_eq!(body, serde_json::json!({"success": true, "data": [1]}));
    }
}
