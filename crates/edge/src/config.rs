//! Application configuration

use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub public_url: String,
    pub base_domain: String, // e.g., "signalboard.io" for *.signalboard.io routing

    /// First-party subdomains that belong to the product surface, not to a
    /// tenant (e.g. "www", "app"). Requests to these classify as main domain.
    pub first_party_subdomains: Vec<String>,

    /// Comma-separated allow-list of origin host patterns (literal or one
    /// `*` wildcard) trusted for credentialed CORS on the auth endpoint.
    pub auth_trusted_origins: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Caching
    pub tenant_cache_ttl_secs: u64,
    pub verification_cache_ttl_secs: u64,

    // Session
    pub session_cookie_name: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            base_domain: env::var("BASE_DOMAIN").unwrap_or_else(|_| "localhost".to_string()),

            first_party_subdomains: env::var("FIRST_PARTY_SUBDOMAINS")
                .unwrap_or_else(|_| "www,app".to_string())
                .split(',')
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),

            auth_trusted_origins: env::var("AUTH_TRUSTED_ORIGINS").unwrap_or_default(),

            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),

            // Verification status must be re-read promptly after a flip, so
            // its TTL defaults shorter than the plain tenant lookup TTL.
            tenant_cache_ttl_secs: env::var("TENANT_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            verification_cache_ttl_secs: env::var("VERIFICATION_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),

            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "sb_session".to_string()),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure config tests run serially (they modify shared env vars)
    static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_missing_database_url_fails() {
        let _lock = CONFIG_TEST_MUTEX.lock().unwrap();
        env::remove_var("DATABASE_URL");

        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn test_defaults_and_subdomain_list() {
        let _lock = CONFIG_TEST_MUTEX.lock().unwrap();
        env::set_var("DATABASE_URL", "postgres://test");
        env::set_var("FIRST_PARTY_SUBDOMAINS", "www, App ,api,");
        env::remove_var("AUTH_TRUSTED_ORIGINS");

        let config = Config::from_env().unwrap();
        assert_eq!(config.first_party_subdomains, vec!["www", "app", "api"]);
        assert_eq!(config.session_cookie_name, "sb_session");
        assert!(config.verification_cache_ttl_secs < config.tenant_cache_ttl_secs);

        env::remove_var("DATABASE_URL");
        env::remove_var("FIRST_PARTY_SUBDOMAINS");
    }
}
