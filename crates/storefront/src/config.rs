//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SHOWCASE_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOWCASE_PORT` - Listen port (default: 3000)
//! - `SHOWCASE_STORAGE_PATH` - JSON file holding the cart (default: .pshowcase/storage.json)
//! - `SHOWCASE_PAGE_SIZE` - Products per listing page (default: 10)
//! - `CATALOG_BASE_URL` - Product catalog API (default: <https://fakestoreapi.com>)
//! - `CATALOG_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `CATALOG_CACHE_TTL_SECS` - Response cache lifetime (default: 300)
//! - `CATALOG_MAX_ATTEMPTS` - Attempts per request including the first (default: 3)
//! - `CATALOG_RETRY_BASE_MS` - First retry delay, doubled per attempt (default: 250)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// File backing the persisted cart and session slots
    pub storage_path: PathBuf,
    /// Products per listing page
    pub page_size: usize,
    /// Remote catalog configuration
    pub catalog: CatalogConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Remote catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; `/products` is appended
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Response cache lifetime
    pub cache_ttl: Duration,
    /// Attempts per request, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub retry_base_delay: Duration,
}

const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parse_or("SHOWCASE_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parse_or("SHOWCASE_PORT", 3000_u16)?;
        let storage_path = PathBuf::from(env.get_or("SHOWCASE_STORAGE_PATH", ".pshowcase/storage.json"));
        let page_size = env.parse_or("SHOWCASE_PAGE_SIZE", pshowcase_core::view::DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOWCASE_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let catalog = CatalogConfig::from_env(&env)?;

        Ok(Self {
            host,
            port,
            storage_path,
            page_size,
            catalog,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CatalogConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let base_url = env.get_or("CATALOG_BASE_URL", DEFAULT_CATALOG_URL);
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("CATALOG_BASE_URL".to_string(), e.to_string())
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_BASE_URL".to_string(),
                format!("unsupported scheme '{}'", base_url.scheme()),
            ));
        }

        let max_attempts = env.parse_or("CATALOG_MAX_ATTEMPTS", 3_u32)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_MAX_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(env.parse_or("CATALOG_TIMEOUT_SECS", 10)?),
            cache_ttl: Duration::from_secs(env.parse_or("CATALOG_CACHE_TTL_SECS", 300)?),
            max_attempts,
            retry_base_delay: Duration::from_millis(env.parse_or("CATALOG_RETRY_BASE_MS", 250)?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source used while loading.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable. Empty values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.storage_path, PathBuf::from(".pshowcase/storage.json"));
        assert_eq!(config.page_size, 10);
        assert_eq!(config.catalog.base_url.as_str(), "https://fakestoreapi.com/");
        assert_eq!(config.catalog.max_attempts, 3);
        assert_eq!(config.catalog.cache_ttl, Duration::from_secs(300));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SHOWCASE_HOST", "0.0.0.0"),
            ("SHOWCASE_PORT", "8080"),
            ("SHOWCASE_PAGE_SIZE", "4"),
            ("CATALOG_BASE_URL", "http://127.0.0.1:9000"),
            ("CATALOG_MAX_ATTEMPTS", "5"),
            ("CATALOG_RETRY_BASE_MS", "10"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.page_size, 4);
        assert_eq!(config.catalog.base_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.catalog.max_attempts, 5);
        assert_eq!(config.catalog.retry_base_delay, Duration::from_millis(10));
        assert_eq!(
            config.sentry_dsn.as_deref(),
            Some("https://key@sentry.example/1")
        );
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let config = load(&[("SHOWCASE_PORT", ""), ("SENTRY_DSN", "  ")]).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("SHOWCASE_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "SHOWCASE_PORT"));
    }

    #[test]
    fn test_invalid_catalog_url() {
        assert!(load(&[("CATALOG_BASE_URL", "not a url")]).is_err());
        assert!(load(&[("CATALOG_BASE_URL", "ftp://example.com")]).is_err());
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(load(&[("CATALOG_MAX_ATTEMPTS", "0")]).is_err());
        assert!(load(&[("SHOWCASE_PAGE_SIZE", "0")]).is_err());
    }
}
