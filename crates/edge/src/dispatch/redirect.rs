//! Redirect target validation and the fallback chain
//!
//! Candidate redirect targets arrive from a query parameter or a cookie and
//! are attacker-controlled. Only same-origin absolute paths are ever
//! followed; anything else is silently discarded and the fallback chain
//! takes over.

use super::{START_PATH, WORKSPACES_PREFIX};

/// Whether a candidate redirect target is a same-origin absolute path.
///
/// `//host/...` is scheme-relative and would leave the origin, so a second
/// leading slash disqualifies the candidate along with absolute URLs and
/// anything not starting with `/`.
pub fn is_safe_redirect_target(candidate: &str) -> bool {
    candidate.starts_with('/') && !candidate.starts_with("//")
}

/// The workspace root path for a slug.
pub fn workspace_root_path(slug: &str) -> String {
    format!("{WORKSPACES_PREFIX}/{slug}")
}

/// Resolve a redirect destination from an untrusted candidate and the
/// last-workspace cookie:
/// 1. a safe candidate is used verbatim,
/// 2. else the last workspace's root,
/// 3. else the generic start page.
pub fn safe_redirect_target(candidate: Option<&str>, last_workspace_slug: Option<&str>) -> String {
    if let Some(candidate) = candidate {
        if is_safe_redirect_target(candidate) {
            return candidate.to_string();
        }
    }

    match last_workspace_slug {
        Some(slug) if !slug.is_empty() => workspace_root_path(slug),
        _ => START_PATH.to_string(),
    }
}
