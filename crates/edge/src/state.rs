//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::Config;
use crate::directory::{PgDirectory, TenantDirectory};
use crate::dispatch::DispatchPipeline;
use crate::routing::TenantResolver;
use crate::trust::{parse_allow_list, OriginTrustEvaluator};

/// Application state shared across handlers and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: PgPool,
    pub resolver: TenantResolver,
    pub pipeline: DispatchPipeline,
    pub trust: OriginTrustEvaluator,
}

impl AppState {
    /// Build state backed by the Postgres tenant directory.
    pub fn new(config: Config, pool: PgPool) -> Self {
        let directory = Arc::new(PgDirectory::new(pool.clone()));
        Self::with_directory(config, pool, directory)
    }

    /// Build state with an explicit directory implementation. Tests inject
    /// an in-memory fake here.
    pub fn with_directory(
        config: Config,
        pool: PgPool,
        directory: Arc<dyn TenantDirectory>,
    ) -> Self {
        let resolver = TenantResolver::new(
            directory.clone(),
            Duration::from_secs(config.tenant_cache_ttl_secs),
        );
        let pipeline = DispatchPipeline::new(resolver.clone());
        let trust = OriginTrustEvaluator::new(
            parse_allow_list(&config.auth_trusted_origins),
            directory,
            Duration::from_secs(config.verification_cache_ttl_secs),
        );

        Self {
            config: Arc::new(config),
            pool,
            resolver,
            pipeline,
            trust,
        }
    }
}
