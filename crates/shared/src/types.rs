//! Common types used across Signalboard

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// Tenants (workspaces)
// =============================================================================

/// A workspace as seen by the edge layer.
///
/// The slug is the immutable tenant identity. `default_host` is the host the
/// platform issued at creation time; historical rows store it in several
/// formats (bare host, `https://host`, `https://host/`), so callers must not
/// assume any single shape. `custom_host` is the user-supplied host, if any;
/// its presence says nothing about verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: Uuid,
    pub slug: String,
    pub default_host: String,
    pub custom_host: Option<String>,
}

// =============================================================================
// Domain verification
// =============================================================================

/// Domain verification status (stored as TEXT in PostgreSQL)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    #[default]
    Pending,
    Verified,
    Failed,
}

impl FromStr for DomainStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DomainStatus::Pending),
            "verified" => Ok(DomainStatus::Verified),
            "failed" => Ok(DomainStatus::Failed),
            // Unknown values read as Pending so they never grant trust
            _ => Ok(DomainStatus::Pending),
        }
    }
}

impl DomainStatus {
    pub fn is_verified(self) -> bool {
        matches!(self, DomainStatus::Verified)
    }
}

/// One verification record per custom host.
///
/// A tenant's `custom_host` being set does not imply a record exists, and a
/// record existing does not imply `Verified`; trust decisions must check the
/// status explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainVerification {
    pub host: String,
    pub status: DomainStatus,
}
