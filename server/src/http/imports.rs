//! Import endpoints.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use super::{ApiError, ApiResponse, ApiResult, AppState, parse_page};
use crate::filter::{DocumentKind, QueryParams, compile, normalize_import_id};
use crate::imports::{
    ImportError, ImportRecord, NewImport, build_import, new_import_id, now_millis,
};

impl From<ImportError> for ApiError {
    fn from(e: ImportError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// `GET /api/imports`: every import record, paged.
pub async fn list_imports(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Vec<ImportRecord>> {
    let params = QueryParams::from_pairs(pairs);
    state.authenticate(&params)?;
    let page = parse_page(&params)?;

    let predicate = compile(DocumentKind::Import, None, &[]);
    let result = state.store.query_page(&predicate.select_all(), page).await?;
    tracing::debug!("returning {} of {} imports", result.items.len(), result.total);

    Ok(Json(ApiResponse::ok(ImportRecord::from_results(result.items))))
}

/// `GET /api/imports/{id}`: one import record.
///
/// The id goes through the same normalization as `fileId`, so a legacy
/// double-prefixed record is found from its bare or single-prefixed id.
pub async fn get_import(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<ImportRecord> {
    let params = QueryParams::from_pairs(pairs);
    state.authenticate(&params)?;

    let candidates = normalize_import_id(&id);
    tracing::debug!(%candidates, "looking up import");
    let predicate = compile(DocumentKind::Import, Some(candidates.as_slice()), &[]);
    let records = state.store.query(&predicate.select_all()).await?;

    ImportRecord::from_results(records)
        .into_iter()
        .next()
        .map(|record| Json(ApiResponse::ok(record)))
        .ok_or_else(|| ApiError::not_found(format!("import '{id}' not found")))
}

/// `POST /api/imports`: store an uploaded sheet as an import record plus rows.
pub async fn create_import(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
    body: Result<Json<NewImport>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ImportRecord>>), ApiError> {
    let params = QueryParams::from_pairs(pairs);
    let principal = state.authenticate(&params)?;
    let Json(request) = body?;

    let batch = build_import(
        request,
        new_import_id(),
        principal.map(|p| p.subject),
        now_millis(),
    )?;
    let record = batch.record;
    tracing::info!(
        "storing import {} ({} rows from '{}')",
        record.id,
        record.row_count,
        record.file_name
    );

    state.store.insert(batch.documents).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(record))))
}
