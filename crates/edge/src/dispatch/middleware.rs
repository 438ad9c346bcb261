//! Axum integration for the dispatch pipeline
//!
//! Applied ahead of route matching. Rewrites mutate the request URI in
//! place (client-invisible, query preserved); redirects terminate the
//! request with a 302.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{HOST, LOCATION},
        uri::{PathAndQuery, Uri},
        HeaderValue, Request, Response, StatusCode,
    },
    middleware::Next,
    response::IntoResponse,
};
use url::form_urlencoded;

use super::{DispatchOutcome, RequestContext, SessionPresence};
use crate::host;
use crate::state::AppState;

/// Middleware that runs the dispatch pipeline for every inbound request.
pub async fn dispatch_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response<Body> {
    if is_dispatch_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let ctx = request_context(&request, &state);

    match state.pipeline.dispatch(&ctx).await {
        DispatchOutcome::PassThrough => next.run(request).await,
        DispatchOutcome::Rewrite { path } => {
            // A path that can't form a valid URI reads as a routing miss
            if !rewrite_request_path(&mut request, &path) {
                tracing::warn!(%path, "rewritten path is not a valid URI, passing through");
            }
            next.run(request).await
        }
        DispatchOutcome::Redirect { location } => match HeaderValue::from_str(&location) {
            Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
            Err(_) => {
                tracing::warn!(%location, "redirect location is not a valid header value");
                next.run(request).await
            }
        },
    }
}

/// API, internal and probe paths sit outside the page-dispatch surface;
/// they are served as addressed regardless of host.
fn is_dispatch_exempt(path: &str) -> bool {
    path == "/health"
        || path.starts_with("/health/")
        || path.starts_with("/api/")
        || path.starts_with("/internal/")
}

fn request_context(request: &Request<Body>, state: &AppState) -> RequestContext {
    let raw_host = request.headers().get(HOST).and_then(|v| v.to_str().ok());

    RequestContext {
        host: host::classify(raw_host, &state.config),
        path: request.uri().path().to_string(),
        redirect_param: request.uri().query().and_then(redirect_param),
        session: SessionPresence::from_headers(
            request.headers(),
            &state.config.session_cookie_name,
        ),
    }
}

/// Decode the `redirect` query parameter, if present.
fn redirect_param(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "redirect")
        .map(|(_, value)| value.into_owned())
}

/// Swap the request's path, keeping the original query string.
fn rewrite_request_path(request: &mut Request<Body>, new_path: &str) -> bool {
    let path_and_query = match request.uri().query() {
        Some(query) => format!("{new_path}?{query}"),
        None => new_path.to_string(),
    };

    let Ok(path_and_query) = path_and_query.parse::<PathAndQuery>() else {
        return false;
    };

    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query = Some(path_and_query);

    match Uri::from_parts(parts) {
        Ok(uri) => {
            *request.uri_mut() = uri;
            true
        }
        Err(_) => false,
    }
}
