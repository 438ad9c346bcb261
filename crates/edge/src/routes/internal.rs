//! Internal cache management endpoints
//!
//! Called by the workspace-management and domain-verification services when
//! a tenant's hosts change or a verification flips, so cached entries don't
//! outlive the change.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{EdgeError, EdgeResult};
use crate::host::normalize_host;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct InvalidateParams {
    pub host: String,
}

/// Drop all cached state for a host (tenant resolution and verification).
pub async fn invalidate_host(
    State(state): State<AppState>,
    Query(params): Query<InvalidateParams>,
) -> EdgeResult<StatusCode> {
    let host = normalize_host(&params.host);
    if host.is_empty() {
        return Err(EdgeError::BadRequest("host is required".to_string()));
    }

    state.resolver.invalidate_host(&host);
    state.trust.invalidate_verification(&host);
    tracing::info!(%host, "invalidated cached host state");

    Ok(StatusCode::NO_CONTENT)
}

/// Report cache occupancy, for operators chasing stale-entry reports.
pub async fn cache_stats(State(state): State<AppState>) -> Json<Value> {
    let tenants = state.resolver.cache_stats();
    let verifications = state.trust.verification_cache_stats();

    Json(json!({
        "tenant_cache": {
            "total_entries": tenants.total_entries,
            "active_entries": tenants.active_entries,
            "expired_entries": tenants.expired_entries,
        },
        "verification_cache": {
            "total_entries": verifications.total_entries,
            "active_entries": verifications.active_entries,
            "expired_entries": verifications.expired_entries,
        },
    }))
}
