//! Origin trust for the shared auth endpoint
//!
//! Decides whether a cross-origin caller may receive credentialed CORS
//! responses. This is deliberately separate from tenant routing: a host that
//! routes to a tenant is not trusted for credentialed auth unless it also
//! passes the checks here, and every failure path denies.

mod evaluator;
mod pattern;

pub use evaluator::OriginTrustEvaluator;
pub use pattern::{parse_allow_list, OriginPattern};
