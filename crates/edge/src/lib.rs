//! Signalboard Edge Library
//!
//! This crate contains the edge request-dispatch layer for Signalboard: it
//! classifies the `Host` header, resolves tenants, runs the dispatch
//! pipeline (rewrites, redirects, auth guard) and decides credentialed-CORS
//! trust for the shared auth endpoint.

pub mod config;
pub mod directory;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod routes;
pub mod routing;
pub mod state;
pub mod trust;

pub use config::Config;
pub use dispatch::{DispatchOutcome, DispatchPipeline};
pub use error::{EdgeError, EdgeResult};
pub use routing::{HostCache, TenantResolver};
pub use state::AppState;
pub use trust::OriginTrustEvaluator;
