// Operational endpoints: health, cache controls, telemetry intake, the
// on-demand reload, and the minimal HTML catalog browser.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Html;
use axum::Json;
use moniker_core::telemetry::AccessEvent;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::reload;
use crate::routes::resolve::caller_from;
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "nodes": state.registry.len(),
        "cache": {
            "size": state.resolve_cache.len(),
            "enabled": state.cache_enabled,
        },
    }))
}

/// GET /cache/status
pub async fn cache_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "backend": "in-memory",
        "enabled": state.cache_enabled,
        "size": state.resolve_cache.len(),
        "ttl_seconds": state.resolve_cache.ttl().as_secs(),
    }))
}

/// POST /cache/refresh/{path...} - drop cached resolve results under a path.
pub async fn cache_refresh(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Json<Value> {
    let invalidated = state.resolve_cache.invalidate_prefix(&path);
    Json(json!({
        "path": path,
        "status": "ok",
        "invalidated": invalidated,
    }))
}

/// POST /telemetry/access - accept an access event and hand it to the sink.
/// Always 202: telemetry must never fail a client.
pub async fn telemetry_access(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> (StatusCode, Json<Value>) {
    let payload = body.map(|Json(value)| value).unwrap_or(Value::Null);
    let caller = caller_from(&headers);

    let moniker = payload
        .get("moniker")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let mut event = AccessEvent::new(moniker, caller.user_id, caller.source);
    if let Some(map) = payload.as_object() {
        for (key, value) in map {
            if key != "moniker" {
                event.extra.insert(key.clone(), value.clone());
            }
        }
    }
    state.telemetry.emit(&event);

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "status": "accepted",
            "event_id": event.event_id,
        })),
    )
}

/// POST /config/reload - synchronous reload of the catalog file. On failure
/// the previous snapshot keeps serving and the error is surfaced here.
pub async fn config_reload(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    match reload::reload_now(&state) {
        Ok(nodes) => Ok(Json(json!({
            "status": "reloaded",
            "nodes": nodes,
        }))),
        Err(err) => Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "reload failed",
            err.to_string(),
        )),
    }
}

/// GET /ui - minimal HTML catalog browser.
pub async fn ui() -> Html<&'static str> {
    Html(UI_HTML)
}

const UI_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Moniker Catalog Browser</title>
    <style>
        body { font-family: system-ui, sans-serif; margin: 2rem; color: #222; }
        h1 { font-size: 1.4rem; }
        .info { background: #f4f4f4; padding: 1rem; border-radius: 6px; max-width: 40rem; }
        code { background: #e8e8e8; padding: 0 0.25rem; border-radius: 3px; }
    </style>
</head>
<body>
    <h1>Moniker Catalog Browser</h1>
    <div class="info">
        <p>Resolve logical data names without hardcoding connections.</p>
        <ul>
            <li><code>/catalog</code> - paginated path listing</li>
            <li><code>/catalog/search?q=term</code> - substring search</li>
            <li><code>/resolve/&lt;path&gt;</code> - full resolution</li>
            <li><code>/describe/&lt;path&gt;</code> - metadata and ownership</li>
            <li><code>/health</code> - service health</li>
        </ul>
    </div>
</body>
</html>"#;
