//! Host classification
//!
//! Parses a request's `Host` header into a normalized host and classifies it
//! relative to the configured main/apex domain. Classification is best-effort
//! and never fails: a missing or malformed header classifies as "not main
//! domain, no host", which downstream stages treat as "no tenant resolvable".

use crate::config::Config;

/// Label prefixing hosts served by the feedback vanity-path surface
/// (e.g. `feedback.acme.com`).
pub const FEEDBACK_LABEL: &str = "feedback.";

/// A classified request host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostClass {
    /// Normalized host: lowercased, port stripped. Empty if the header was
    /// missing or unusable.
    pub host_no_port: String,
    /// True iff the host is the apex domain or a first-party subdomain of it.
    pub is_main_domain: bool,
}

impl HostClass {
    /// Whether the host carries the feedback vanity label.
    pub fn is_feedback_host(&self) -> bool {
        self.host_no_port.starts_with(FEEDBACK_LABEL)
    }

    /// The host with the feedback label stripped, if present.
    pub fn feedback_stripped(&self) -> &str {
        self.host_no_port
            .strip_prefix(FEEDBACK_LABEL)
            .unwrap_or(&self.host_no_port)
    }
}

/// Classify a raw `Host` header value against the configured apex domain.
pub fn classify(raw_host: Option<&str>, config: &Config) -> HostClass {
    let host_no_port = match raw_host {
        Some(raw) => normalize_host(raw),
        None => String::new(),
    };

    if host_no_port.is_empty() {
        return HostClass {
            host_no_port,
            is_main_domain: false,
        };
    }

    let is_main_domain = host_no_port == config.base_domain
        || config
            .first_party_subdomains
            .iter()
            .any(|sub| host_no_port == format!("{}.{}", sub, config.base_domain));

    HostClass {
        host_no_port,
        is_main_domain,
    }
}

/// Normalize a host header value: strip the port, lowercase.
pub fn normalize_host(host: &str) -> String {
    let host = host.split(':').next().unwrap_or(host);
    host.trim().to_lowercase()
}
