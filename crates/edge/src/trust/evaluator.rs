//! Credentialed-CORS trust decisions
//!
//! `is_trusted` answers: may this `Origin` receive CORS headers that permit
//! credentialed requests to the shared auth endpoint?
//!
//! Check order:
//! 1. static allow-list patterns,
//! 2. the host's verification record, when one exists: `verified` grants,
//!    `pending`/`failed` vetoes (a custom-host reservation never outranks
//!    its own verification record),
//! 3. a tenant owning the hostname (custom host or any stored form of the
//!    default host).
//!
//! Unlike routing, every failure here denies: an undeserved grant is a
//! security defect, a denied same-origin caller is unaffected.

use std::sync::Arc;
use std::time::Duration;

use signalboard_shared::DomainStatus;
use url::Url;

use super::OriginPattern;
use crate::directory::{stored_host_forms, DirectoryError, TenantDirectory};
use crate::routing::HostCache;

#[derive(Clone)]
pub struct OriginTrustEvaluator {
    patterns: Arc<Vec<OriginPattern>>,
    directory: Arc<dyn TenantDirectory>,
    verification_cache: Arc<HostCache<Option<DomainStatus>>>,
}

impl OriginTrustEvaluator {
    pub fn new(
        patterns: Vec<OriginPattern>,
        directory: Arc<dyn TenantDirectory>,
        verification_cache_ttl: Duration,
    ) -> Self {
        Self {
            patterns: Arc::new(patterns),
            directory,
            verification_cache: Arc::new(HostCache::new(verification_cache_ttl)),
        }
    }

    /// Decide whether `origin` may receive credentialed CORS headers.
    pub async fn is_trusted(&self, origin: &str) -> bool {
        let Some(host) = origin_host(origin) else {
            return false;
        };

        if self.patterns.iter().any(|pattern| pattern.matches(&host)) {
            return true;
        }

        match self.host_is_trusted(&host).await {
            Ok(trusted) => trusted,
            Err(err) => {
                // Fail closed
                tracing::warn!(%host, error = %err, "origin trust lookup failed, denying");
                false
            }
        }
    }

    async fn host_is_trusted(&self, host: &str) -> Result<bool, DirectoryError> {
        // A verification record is authoritative for its host: `verified`
        // grants, anything else vetoes - even when a tenant holds the host
        // as a custom-host reservation.
        if let Some(status) = self.verification_status(host).await? {
            return Ok(status.is_verified());
        }

        if self.directory.tenant_by_custom_host(host).await?.is_some() {
            return Ok(true);
        }

        for stored in stored_host_forms(host) {
            if self
                .directory
                .tenant_by_default_host(&stored)
                .await?
                .is_some()
            {
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn verification_status(&self, host: &str) -> Result<Option<DomainStatus>, DirectoryError> {
        if let Some(cached) = self.verification_cache.get(host) {
            return Ok(cached);
        }

        let status = self
            .directory
            .verification_by_host(host)
            .await?
            .map(|v| v.status);
        self.verification_cache.set(host, status);
        Ok(status)
    }

    /// Drop the cached verification status for a host. Called when a
    /// verification transition is observed; stale `verified` entries must
    /// not outlive the flip.
    pub fn invalidate_verification(&self, host: &str) {
        self.verification_cache.invalidate(host);
    }

    pub fn verification_cache_stats(&self) -> crate::routing::CacheStats {
        self.verification_cache.stats()
    }
}

/// Extract the normalized hostname from an `Origin` header value.
/// Anything unparseable (including `null`) reads as "no host".
fn origin_host(origin: &str) -> Option<String> {
    let url = Url::parse(origin.trim()).ok()?;
    match url.scheme() {
        "http" | "https" => {}
        _ => return None,
    }
    url.host_str().map(str::to_lowercase)
}
