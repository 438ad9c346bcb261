//! Host-to-tenant resolution
//!
//! Resolves normalized hosts to tenants for routing. Lookup order tolerates
//! the historical storage formats of the default host (see
//! [`stored_host_forms`]):
//! 1. `custom_host` exact match
//! 2. `default_host` stored bare
//! 3. `default_host` stored as `https://<host>`
//! 4. `default_host` stored as `https://<host>/`
//!
//! Resolution is a routing concern and fails open: a directory error logs a
//! warning and reads as "no tenant", never as a request error.

use std::sync::Arc;
use std::time::Duration;

use signalboard_shared::Tenant;

use super::HostCache;
use crate::directory::{stored_host_forms, DirectoryError, TenantDirectory};
use crate::host::FEEDBACK_LABEL;

/// Tenant resolver with caching
#[derive(Clone)]
pub struct TenantResolver {
    directory: Arc<dyn TenantDirectory>,
    cache: Arc<HostCache<Option<Tenant>>>,
}

impl TenantResolver {
    pub fn new(directory: Arc<dyn TenantDirectory>, cache_ttl: Duration) -> Self {
        Self {
            directory,
            cache: Arc::new(HostCache::new(cache_ttl)),
        }
    }

    /// Resolve a normalized host to a tenant.
    ///
    /// Hosts carrying the feedback vanity label are matched with the label
    /// stripped. Returns `None` on a miss or on any lookup failure.
    pub async fn resolve(&self, host_no_port: &str) -> Option<Tenant> {
        if host_no_port.is_empty() {
            return None;
        }

        // feedback.<host> routes to the tenant owning <host>
        let host = host_no_port
            .strip_prefix(FEEDBACK_LABEL)
            .unwrap_or(host_no_port);

        if let Some(cached) = self.cache.get(host) {
            return cached;
        }

        match self.lookup(host).await {
            Ok(tenant) => {
                self.cache.set(host, tenant.clone());
                tenant
            }
            Err(err) => {
                // Fail open: a routing miss degrades to main-domain handling.
                // Errors are not cached so the next request retries.
                tracing::warn!(host, error = %err, "tenant lookup failed, continuing unresolved");
                None
            }
        }
    }

    /// Ordered multi-format lookup, first match wins.
    async fn lookup(&self, host: &str) -> Result<Option<Tenant>, DirectoryError> {
        if let Some(tenant) = self.directory.tenant_by_custom_host(host).await? {
            return Ok(Some(tenant));
        }

        for stored in stored_host_forms(host) {
            if let Some(tenant) = self.directory.tenant_by_default_host(&stored).await? {
                return Ok(Some(tenant));
            }
        }

        Ok(None)
    }

    /// Invalidate the cached entry for a host (both label-stripped and not).
    pub fn invalidate_host(&self, host: &str) {
        let host = host.strip_prefix(FEEDBACK_LABEL).unwrap_or(host);
        self.cache.invalidate(host);
    }

    pub fn cache_stats(&self) -> super::CacheStats {
        self.cache.stats()
    }
}
