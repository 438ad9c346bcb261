//! Tenant directory collaborator
//!
//! The edge layer never owns tenant or verification data; it reads them
//! through this interface. The Postgres implementation runs point-in-time
//! lookups per request; callers decide the failure policy (routing fails
//! open, trust fails closed).

use async_trait::async_trait;
use sqlx::PgPool;
use std::str::FromStr;

use signalboard_shared::{DomainStatus, DomainVerification, Tenant};

/// The three historical storage formats of a tenant's default host.
///
/// The canonical host column was written by different code paths over time:
/// bare host, `https://host`, and `https://host/`. Resolution tries each form
/// in order instead of assuming legacy rows have been migrated.
pub fn stored_host_forms(host: &str) -> [String; 3] {
    [
        host.to_string(),
        format!("https://{host}"),
        format!("https://{host}/"),
    ]
}

/// Errors that can occur during directory lookups
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for DirectoryError {
    fn from(err: sqlx::Error) -> Self {
        DirectoryError::Database(err.to_string())
    }
}

/// Read-only lookups against the tenant store
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Find a tenant whose custom host equals `host` (case-insensitive).
    async fn tenant_by_custom_host(&self, host: &str) -> Result<Option<Tenant>, DirectoryError>;

    /// Find a tenant whose default host equals `stored` exactly as written
    /// (case-insensitive). Callers pass each historical form in turn.
    async fn tenant_by_default_host(&self, stored: &str) -> Result<Option<Tenant>, DirectoryError>;

    /// Find the verification record for `host`, if one exists.
    async fn verification_by_host(
        &self,
        host: &str,
    ) -> Result<Option<DomainVerification>, DirectoryError>;
}

/// Postgres-backed tenant directory
#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct VerificationRow {
    host: String,
    status: String,
}

#[async_trait]
impl TenantDirectory for PgDirectory {
    async fn tenant_by_custom_host(&self, host: &str) -> Result<Option<Tenant>, DirectoryError> {
        let tenant: Option<Tenant> = sqlx::query_as(
            "SELECT id, slug, default_host, custom_host FROM workspaces \
             WHERE LOWER(custom_host) = $1",
        )
        .bind(host.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn tenant_by_default_host(&self, stored: &str) -> Result<Option<Tenant>, DirectoryError> {
        let tenant: Option<Tenant> = sqlx::query_as(
            "SELECT id, slug, default_host, custom_host FROM workspaces \
             WHERE LOWER(default_host) = $1",
        )
        .bind(stored.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn verification_by_host(
        &self,
        host: &str,
    ) -> Result<Option<DomainVerification>, DirectoryError> {
        let row: Option<VerificationRow> = sqlx::query_as(
            "SELECT host, status::TEXT as status FROM domain_verifications \
             WHERE LOWER(host) = $1",
        )
        .bind(host.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| DomainVerification {
            host: row.host,
            status: DomainStatus::from_str(&row.status).unwrap_or_default(),
        }))
    }
}
