//! Session presence
//!
//! The edge never decodes the session cookie; it only observes that one
//! exists, plus the last-visited-workspace hint. Everything else in the
//! cookie jar is opaque here.

use axum::http::{header::COOKIE, HeaderMap};

/// Cookie holding the slug of the last workspace the user visited
pub const LAST_WORKSPACE_COOKIE: &str = "lastWorkspaceSlug";

/// What the edge knows about the caller's session: that it exists, and the
/// last workspace hint. Nothing more.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPresence {
    pub has_session: bool,
    pub last_workspace_slug: Option<String>,
}

impl SessionPresence {
    /// Read session presence from the request's `Cookie` header.
    pub fn from_headers(headers: &HeaderMap, session_cookie_name: &str) -> Self {
        Self {
            has_session: cookie_value(headers, session_cookie_name).is_some(),
            last_workspace_slug: cookie_value(headers, LAST_WORKSPACE_COOKIE),
        }
    }
}

/// Extract a single cookie's value, treating empty values as absent.
fn cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    for part in raw.split(';') {
        let mut pieces = part.trim().splitn(2, '=');
        let key = pieces.next()?.trim();
        let value = pieces.next()?.trim();

        if key == cookie_name && !value.is_empty() {
            return Some(value.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(raw: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(raw).unwrap());
        headers
    }

    #[test]
    fn test_session_and_last_workspace_read() {
        let headers = headers_with_cookie("sb_session=opaque-token; lastWorkspaceSlug=acme");
        let session = SessionPresence::from_headers(&headers, "sb_session");
        assert!(session.has_session);
        assert_eq!(session.last_workspace_slug.as_deref(), Some("acme"));
    }

    #[test]
    fn test_no_cookie_header() {
        let session = SessionPresence::from_headers(&HeaderMap::new(), "sb_session");
        assert_eq!(session, SessionPresence::default());
    }

    #[test]
    fn test_other_cookies_are_opaque() {
        let headers = headers_with_cookie("theme=dark; _ga=GA1.2.3");
        let session = SessionPresence::from_headers(&headers, "sb_session");
        assert!(!session.has_session);
        assert!(session.last_workspace_slug.is_none());
    }

    #[test]
    fn test_empty_values_read_as_absent() {
        let headers = headers_with_cookie("sb_session=; lastWorkspaceSlug=");
        let session = SessionPresence::from_headers(&headers, "sb_session");
        assert!(!session.has_session);
        assert!(session.last_workspace_slug.is_none());
    }
}
