//! Edge routes
//!
//! The edge owns very few routes of its own: health probes, the shared auth
//! session endpoint (with dynamic CORS), and internal cache management. All
//! other paths fall through to the page layer after the dispatch pipeline
//! has classified, rewritten or redirected them.

pub mod auth;
pub mod health;
pub mod internal;

use axum::{
    http::Uri,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::dispatch::dispatch_middleware;
use crate::state::AppState;

/// Create all edge routes
pub fn create_router(state: AppState) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Shared auth endpoint with per-origin credentialed CORS. The
    // middleware also answers OPTIONS preflights.
    let auth_routes = Router::new()
        .route("/api/auth/session", get(auth::session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_cors,
        ));

    // Cache invalidation hooks for the workspace-management and
    // domain-verification services
    let internal_routes = Router::new()
        .route(
            "/internal/cache/invalidate",
            post(internal::invalidate_host),
        )
        .route("/internal/cache/stats", get(internal::cache_stats));

    Router::new()
        .merge(health_routes)
        .merge(auth_routes)
        .merge(internal_routes)
        .fallback(page_fallback)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            dispatch_middleware,
        ))
        .with_state(state)
}

/// Stand-in for the out-of-scope page layer: reports the internally routed
/// path so operators (and tests) can observe rewrites.
async fn page_fallback(uri: Uri) -> Json<Value> {
    Json(json!({ "routed_path": uri.path() }))
}
