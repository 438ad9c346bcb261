//! Host-based tenant routing
//!
//! This module resolves normalized hosts to tenants, enabling tenant-scoped
//! URLs like:
//! - Issued subdomains: acme.signalboard.io
//! - Custom domains: feedback.company.com
//! - Feedback vanity hosts: feedback.<custom domain>

mod cache;
mod resolver;

pub use cache::{CacheStats, HostCache};
pub use resolver::TenantResolver;
