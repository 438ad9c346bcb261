//! Request dispatch pipeline
//!
//! Runs once per inbound request, ahead of route matching: classifies the
//! host, optionally rewrites the path into a tenant-scoped internal route,
//! applies session-driven redirects and the workspace auth guard. Stage
//! order is fixed and load-bearing; it lives in one list in `pipeline.rs`.

mod middleware;
mod pipeline;
mod redirect;
mod session;

pub use middleware::dispatch_middleware;
pub use pipeline::{DispatchOutcome, DispatchPipeline, RequestContext};
pub use redirect::{is_safe_redirect_target, safe_redirect_target, workspace_root_path};
pub use session::SessionPresence;

/// Sign-in page path
pub const SIGN_IN_PATH: &str = "/auth/sign-in";
/// Sign-up page path
pub const SIGN_UP_PATH: &str = "/auth/sign-up";
/// Generic post-auth landing page
pub const START_PATH: &str = "/start";
/// Prefix guarding the tenant workspace area
pub const WORKSPACES_PREFIX: &str = "/workspaces";
