// Catalog endpoints: paginated listing, search, stats, metadata, tree
// views, the administrative status update, and the audit trail.

use axum::extract::{Path, Query, State};
use axum::Json;
use moniker_core::model::NodeStatus;
use moniker_core::RegistryError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::routes::resolve::caller_from;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 100;
const MAX_PAGE_SIZE: usize = 1000;
const DEFAULT_SEARCH_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

/// GET /catalog - position-based pagination over the sorted path list.
/// The cursor is the last path of the previous page; it is bounded but not
/// stable across a snapshot swap.
pub async fn list_catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Json<Value> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let all_paths = state.registry.all_paths();
    let total = all_paths.len();

    let start = match &query.cursor {
        Some(cursor) => all_paths.partition_point(|path| path <= cursor),
        None => 0,
    };
    let end = (start + limit).min(total);
    let paths = &all_paths[start..end];

    let mut response = json!({
        "paths": paths,
        "count": paths.len(),
        "total": total,
    });
    if end < total {
        if let Some(last) = paths.last() {
            response["next_cursor"] = json!(last);
        }
    }
    Json(response)
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

/// GET /catalog/search?q=&limit=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, ApiError> {
    let needle = query
        .q
        .as_deref()
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("query parameter 'q' is required"))?;
    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).max(1);

    let results = state.registry.search(needle, None, limit);
    Ok(Json(json!({
        "query": needle,
        "count": results.len(),
        "results": results,
    })))
}

/// GET /catalog/stats
pub async fn stats(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "by_status": state.registry.status_counts(),
        "by_source_type": state.registry.source_type_counts(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    status: String,
}

/// PUT /catalog/{path...}/status
///
/// Best-effort mutation of the live snapshot; the change is audited and
/// lost on the next reload. Transition validity is not enforced.
pub async fn update_status(
    State(state): State<AppState>,
    Path(rest): Path<String>,
    headers: axum::http::HeaderMap,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    let path = rest
        .strip_suffix("/status")
        .filter(|path| !path.is_empty())
        .ok_or_else(|| ApiError::not_found("unknown catalog endpoint"))?;

    let status = parse_status(&request.status)?;
    let caller = caller_from(&headers);
    let old_status = state
        .registry
        .update_status(path, status, &caller.user_id)
        .map_err(|err| match err {
            RegistryError::NotRegistered { path } => {
                ApiError::not_found("node not found").with_field("path", path)
            }
            other => ApiError::bad_request(other.to_string()),
        })?;

    Ok(Json(json!({
        "path": path,
        "old_status": old_status.as_str(),
        "new_status": status.as_str(),
        "updated": true,
    })))
}

fn parse_status(raw: &str) -> Result<NodeStatus, ApiError> {
    match raw {
        "draft" => Ok(NodeStatus::Draft),
        "pending_review" => Ok(NodeStatus::PendingReview),
        "approved" => Ok(NodeStatus::Approved),
        "active" => Ok(NodeStatus::Active),
        "deprecated" => Ok(NodeStatus::Deprecated),
        "archived" => Ok(NodeStatus::Archived),
        other => Err(ApiError::bad_request(
            "status must be one of: draft, pending_review, approved, active, deprecated, archived",
        )
        .with_field("provided", other)),
    }
}

/// GET /catalog/{path...}/audit
pub async fn audit_log(
    State(state): State<AppState>,
    Path(rest): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let path = rest
        .strip_suffix("/audit")
        .filter(|path| !path.is_empty())
        .ok_or_else(|| ApiError::not_found("unknown catalog endpoint"))?;

    let entries = state.registry.audit_entries(path);
    Ok(Json(json!({
        "path": path,
        "count": entries.len(),
        "entries": entries,
    })))
}

/// GET /metadata/{path...}
pub async fn metadata(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let node = state
        .registry
        .get(&path)
        .ok_or_else(|| ApiError::not_found("node not found").with_field("path", path.clone()))?;

    let ownership = state.registry.resolve_ownership(&path);
    let binding = state.registry.find_binding(&path);

    let mut response = json!({
        "path": path,
        "node": node,
        "ownership": ownership,
        "has_binding": binding.is_some(),
    });
    if let Some((binding, binding_path)) = binding {
        response["binding_path"] = json!(binding_path);
        response["source_type"] = json!(binding.source_type);
    }
    Ok(Json(response))
}

/// GET /tree and GET /tree/{path...}
pub async fn tree_root(state: State<AppState>) -> Json<Value> {
    tree_view(state, String::new())
}

pub async fn tree_path(state: State<AppState>, Path(path): Path<String>) -> Json<Value> {
    tree_view(state, path)
}

fn tree_view(State(state): State<AppState>, path: String) -> Json<Value> {
    let node = state.registry.get(&path);
    let children: Vec<Value> = state
        .registry
        .children(&path)
        .into_iter()
        .map(|child| {
            json!({
                "path": child.path,
                "display_name": child.display_name,
                "is_leaf": child.is_leaf,
                "status": child.status.as_str(),
            })
        })
        .collect();

    Json(json!({
        "path": path,
        "node": node,
        "count": children.len(),
        "children": children,
    }))
}
