// Resolution endpoints: single resolve, batch resolve, describe, list,
// and lineage. Thin adapters over the engine; all error mapping lives in
// crate::error.

use axum::extract::{Path, RawQuery, State};
use axum::http::HeaderMap;
use axum::Json;
use moniker_core::resolver::{CallerIdentity, DescribeResult, LineageResult, ListResult};
use moniker_core::ResolveResult;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

const MAX_BATCH_SIZE: usize = 100;

/// Caller identity from the observed headers. Recorded, never enforced.
pub fn caller_from(headers: &HeaderMap) -> CallerIdentity {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .filter(|user| !user.is_empty())
        .map(CallerIdentity::api)
        .unwrap_or_else(CallerIdentity::anonymous)
}

/// GET /resolve/{path...}
pub async fn resolve_path(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Json<ResolveResult>, ApiError> {
    if path.is_empty() {
        return Err(ApiError::bad_request("missing moniker path"));
    }

    // Re-attach the query string so moniker parameters survive the route.
    let moniker_str = match query {
        Some(query) if !query.is_empty() => format!("{path}?{query}"),
        _ => path,
    };

    if state.cache_enabled {
        if let Some(hit) = state.resolve_cache.get(&moniker_str) {
            return Ok(Json(hit));
        }
    }

    let caller = caller_from(&headers);
    let result = state.service.resolve(&moniker_str, &caller)?;

    if state.cache_enabled {
        state.resolve_cache.insert(moniker_str, result.clone());
    }
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    monikers: Vec<String>,
}

/// POST /resolve/batch
pub async fn batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BatchRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.monikers.is_empty() {
        return Err(ApiError::bad_request("empty moniker list"));
    }
    if request.monikers.len() > MAX_BATCH_SIZE {
        return Err(
            ApiError::bad_request(format!("at most {MAX_BATCH_SIZE} monikers per batch request"))
                .with_field("count", request.monikers.len()),
        );
    }

    let caller = caller_from(&headers);
    let results: Vec<Value> = request
        .monikers
        .iter()
        .map(|moniker| match state.service.resolve(moniker, &caller) {
            Ok(result) => json!(result),
            Err(err) => json!({
                "moniker": moniker,
                "error": err.to_string(),
            }),
        })
        .collect();

    Ok(Json(json!({
        "count": results.len(),
        "results": results,
    })))
}

/// GET /describe/{path...}
pub async fn describe(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<DescribeResult>, ApiError> {
    if path.is_empty() {
        return Err(ApiError::bad_request("missing path"));
    }
    Ok(Json(state.service.describe(&path)))
}

/// GET /list - children of the root.
pub async fn list_root(State(state): State<AppState>) -> Json<ListResult> {
    Json(state.service.list(""))
}

/// GET /list/{path...}
pub async fn list_path(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Json<ListResult> {
    Json(state.service.list(&path))
}

/// GET /lineage/{path...}
pub async fn lineage(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<LineageResult>, ApiError> {
    if path.is_empty() {
        return Err(ApiError::bad_request("missing path"));
    }
    Ok(Json(state.service.lineage(&path)))
}
