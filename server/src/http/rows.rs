//! Row endpoints.

use axum::Json;
use axum::extract::{Query, State};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{ApiError, ApiResponse, ApiResult, AppState, parse_page};
use crate::filter::{QueryParams, extract_distinct, sanitize_results};

/// A page of sanitized rows.
#[derive(Debug, Serialize)]
pub struct RowsPage {
    pub rows: Vec<Value>,
    pub total: usize,
    pub offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// `GET /api/rows`: rows matching the filters, optionally scoped to `fileId`.
pub async fn list_rows(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<RowsPage> {
    let params = QueryParams::from_pairs(pairs);
    state.authenticate(&params)?;
    let page = parse_page(&params)?;

    let predicate = state.row_predicate(&params);
    tracing::debug!(%predicate, "listing rows");

    let result = state.store.query_page(&predicate.select_all(), page).await?;
    tracing::debug!(
        "returning {} of {} rows (offset {})",
        result.items.len(),
        result.total,
        page.offset
    );

    Ok(Json(ApiResponse::ok(RowsPage {
        rows: sanitize_results(result.items),
        total: result.total,
        offset: page.offset,
        limit: page.limit,
    })))
}

/// `GET /api/rows/distinct`: distinct values of each field listed in `fields`,
/// among rows matching the filters.
pub async fn distinct_values(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Map<String, Value>> {
    let params = QueryParams::from_pairs(pairs);
    state.authenticate(&params)?;

    let fields = params
        .get("fields")
        .map(|value| value.comma_separated())
        .unwrap_or_default();
    if fields.is_empty() {
        return Err(ApiError::bad_request("'fields' must name at least one field"));
    }

    let predicate = state.row_predicate(&params);
    tracing::debug!(%predicate, ?fields, "extracting distinct values");

    let values =
        extract_distinct(state.store.as_ref(), &predicate, &fields, &state.field_types).await?;
    Ok(Json(ApiResponse::ok(values)))
}
