//! Shared auth endpoint and its credentialed-CORS handling
//!
//! The auth endpoint is called from arbitrary tenant subdomains and custom
//! domains, so its CORS policy is dynamic: the [`OriginTrustEvaluator`]
//! decides per origin whether credentialed headers are attached. Untrusted
//! origins get no CORS headers at all; same-origin callers are unaffected.
//!
//! [`OriginTrustEvaluator`]: crate::trust::OriginTrustEvaluator

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN,
        },
        HeaderMap, HeaderValue, Method, Request, Response, StatusCode,
    },
    middleware::Next,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::dispatch::SessionPresence;
use crate::state::AppState;

const ALLOW_METHODS: &str = "GET,POST,OPTIONS";
const ALLOW_HEADERS: &str = "content-type, authorization, x-requested-with";

/// Middleware wrapping the auth routes: answers preflights and attaches
/// credentialed CORS headers for trusted origins only.
pub async fn auth_cors(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let trusted = match origin.as_deref() {
        Some(origin) => state.trust.is_trusted(origin).await,
        None => false,
    };

    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        if trusted {
            if let Some(origin) = origin.as_deref() {
                apply_cors_headers(response.headers_mut(), origin);
            }
        }
        return response;
    }

    let mut response = next.run(request).await;
    if trusted {
        if let Some(origin) = origin.as_deref() {
            apply_cors_headers(response.headers_mut(), origin);
        }
    }
    response
}

/// Echo the origin back with credentials enabled and the fixed method and
/// header allow-lists.
fn apply_cors_headers(headers: &mut HeaderMap, origin: &str) {
    let Ok(origin_value) = HeaderValue::from_str(origin) else {
        return;
    };
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin_value);
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub last_workspace: Option<String>,
}

/// Report session presence. The cookie's contents stay opaque; only its
/// existence and the last-workspace hint are surfaced.
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionResponse> {
    let session = SessionPresence::from_headers(&headers, &state.config.session_cookie_name);

    Json(SessionResponse {
        authenticated: session.has_session,
        last_workspace: session.last_workspace_slug,
    })
}
