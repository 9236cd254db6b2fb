// Route table. Handlers live in one module per concern; everything shares
// AppState and the centralized error mapping.

pub mod catalog;
pub mod ops;
pub mod resolve;

use axum::routing::{get, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(ops::health))
        .route("/resolve/batch", post(resolve::batch))
        .route("/resolve/*path", get(resolve::resolve_path))
        .route("/describe/*path", get(resolve::describe))
        .route("/list", get(resolve::list_root))
        .route("/list/*path", get(resolve::list_path))
        .route("/lineage/*path", get(resolve::lineage))
        .route("/catalog", get(catalog::list_catalog))
        .route("/catalog/search", get(catalog::search))
        .route("/catalog/stats", get(catalog::stats))
        .route(
            "/catalog/*rest",
            put(catalog::update_status).get(catalog::audit_log),
        )
        .route("/metadata/*path", get(catalog::metadata))
        .route("/tree", get(catalog::tree_root))
        .route("/tree/*path", get(catalog::tree_path))
        .route("/cache/status", get(ops::cache_status))
        .route("/cache/refresh/*path", post(ops::cache_refresh))
        .route("/telemetry/access", post(ops::telemetry_access))
        .route("/config/reload", post(ops::config_reload))
        .route("/ui", get(ops::ui))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
