//! Files-by-filter lookup.
//!
//! Two dependent queries: first the distinct import ids of rows matching the
//! filters, then the import records for exactly those ids. The second query
//! cannot start before the first has finished.

use axum::Json;
use axum::extract::{Query, State};
use serde_json::Value;

use super::{ApiResponse, ApiResult, AppState};
use crate::filter::{DocumentKind, QueryParams, compile};
use crate::imports::ImportRecord;

/// `GET /api/files`: imports containing at least one row matching the filters.
pub async fn files_by_filter(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Vec<ImportRecord>> {
    let params = QueryParams::from_pairs(pairs);
    state.authenticate(&params)?;

    let row_predicate = state.row_predicate(&params);
    let import_ids: Vec<String> = state
        .store
        .query(&row_predicate.select_distinct_import_ids())
        .await?
        .into_iter()
        .filter_map(|value| match value {
            Value::String(id) => Some(id),
            _ => None,
        })
        .collect();

    if import_ids.is_empty() {
        tracing::debug!(%row_predicate, "no rows match; skipping import lookup");
        return Ok(Json(ApiResponse::ok(Vec::new())));
    }
    tracing::debug!("rows match {} imports", import_ids.len());

    // Stored partition keys are exact; they are not normalized again.
    let import_predicate = compile(DocumentKind::Import, Some(import_ids.as_slice()), &[]);
    let records = state.store.query(&import_predicate.select_all()).await?;

    Ok(Json(ApiResponse::ok(ImportRecord::from_results(records))))
}
