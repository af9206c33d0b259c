//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_API_URL` - Base URL of the remote product service
//!
//! ## Optional
//! - `CATALOG_TIMEOUT_SECS` - HTTP timeout for catalog requests (default: 10)
//! - `CATALOG_REFRESH_SECS` - Reload the catalog on this interval (default: load once)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `STOREFRONT_PAGE_SIZE` - Products per category page (default: 9)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PAGE_SIZE: usize = 9;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
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
    /// Public base URL for the storefront
    pub base_url: String,
    /// Products shown per category page
    pub page_size: usize,
    /// Remote product service configuration
    pub catalog: CatalogConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g., "production")
    pub sentry_environment: Option<String>,
}

/// Remote product service configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; `/products` is appended to it.
    pub api_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Background reload interval. `None` loads the catalog once at startup.
    pub refresh_interval: Option<Duration>,
}

impl CatalogConfig {
    /// Configuration pointing at `api_url` with default timeout and no refresh.
    #[must_use]
    pub const fn new(api_url: Url) -> Self {
        Self {
            api_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            refresh_interval: None,
        }
    }

    /// Load the catalog section alone (used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `CATALOG_API_URL` is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("CATALOG_API_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("CATALOG_API_URL".to_string()))?;
        let api_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("CATALOG_API_URL".to_string(), e.to_string())
        })?;

        let timeout_secs = parse_or_default(lookup, "CATALOG_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let refresh_interval = lookup("CATALOG_REFRESH_SECS")
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("CATALOG_REFRESH_SECS".to_string(), e.to_string())
                })
            })
            .transpose()?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            refresh_interval,
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(&env_lookup)
    }

    /// Load configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("STOREFRONT_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = parse_or_default(lookup, "STOREFRONT_PORT", 3000u16)?;
        let base_url = lookup("STOREFRONT_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        let page_size = parse_or_default(lookup, "STOREFRONT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            base_url,
            page_size,
            catalog: CatalogConfig::from_lookup(lookup)?,
            sentry_dsn: lookup("SENTRY_DSN"),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Read a variable from the process environment.
fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Parse a variable, falling back to `default` when it is unset.
fn parse_or_default<T>(
    lookup: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let lookup = lookup_from(&[("CATALOG_API_URL", "https://mock.example.test/api")]);
        let config = StorefrontConfig::from_lookup(&lookup).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.page_size, 9);
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.catalog.timeout, Duration::from_secs(10));
        assert!(config.catalog.refresh_interval.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_missing_catalog_url() {
        let lookup = lookup_from(&[]);
        let err = StorefrontConfig::from_lookup(&lookup).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "CATALOG_API_URL"));
    }

    #[test]
    fn test_invalid_catalog_url() {
        let lookup = lookup_from(&[("CATALOG_API_URL", "not a url")]);
        let err = StorefrontConfig::from_lookup(&lookup).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_port() {
        let lookup = lookup_from(&[
            ("CATALOG_API_URL", "https://mock.example.test/api"),
            ("STOREFRONT_PORT", "eighty"),
        ]);
        let err = StorefrontConfig::from_lookup(&lookup).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid environment variable STOREFRONT_PORT: invalid digit found in string"
        );
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let lookup = lookup_from(&[
            ("CATALOG_API_URL", "https://mock.example.test/api"),
            ("STOREFRONT_PAGE_SIZE", "0"),
        ]);
        assert!(StorefrontConfig::from_lookup(&lookup).is_err());
    }

    #[test]
    fn test_refresh_interval() {
        let lookup = lookup_from(&[
            ("CATALOG_API_URL", "https://mock.example.test/api"),
            ("CATALOG_REFRESH_SECS", "300"),
        ]);
        let config = CatalogConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.refresh_interval, Some(Duration::from_secs(300)));

        let lookup = lookup_from(&[
            ("CATALOG_API_URL", "https://mock.example.test/api"),
            ("CATALOG_REFRESH_SECS", "0"),
        ]);
        let config = CatalogConfig::from_lookup(&lookup).unwrap();
        assert!(config.refresh_interval.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let lookup = lookup_from(&[
            ("CATALOG_API_URL", "https://mock.example.test/api"),
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8080"),
            ("STOREFRONT_BASE_URL", "https://shop.example.test"),
        ]);
        let config = StorefrontConfig::from_lookup(&lookup).unwrap();

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8080);
        assert!(config.is_secure());
    }
}
