//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `AURORA_API_BASE_URL` - Backend API base URL (skips the startup probe)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_PREFS_PATH` - Preference store file (default: storefront-prefs.json)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! # Base URL resolution
//!
//! The original SPA picked its backend at module load with a racy global;
//! here the choice is made exactly once at startup by [`resolve_api_base`]
//! and the resolved URL is injected into the API client. The env override
//! wins; otherwise a local dev backend is probed with a short timeout and
//! the remote deployment is used as the fallback.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Local development backend, preferred when it answers the probe.
const LOCAL_API_BASE: &str = "http://localhost:4000/api";
/// Remote deployment used when no local backend is running.
const REMOTE_API_BASE: &str = "https://a-u-r-o-r-a.onrender.com/api";
/// How long the startup probe waits for the local backend.
const PROBE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Request timeout applied to every backend call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Base delay between read retries.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);
/// Maximum number of retries for idempotent reads.
pub const MAX_RETRIES: u32 = 2;

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
    /// Backend base URL override; when unset the startup probe decides
    pub api_base_override: Option<Url>,
    /// Path of the JSON preference store (filters, search history, session)
    pub prefs_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;

        let api_base_override = match get_optional_env("AURORA_API_BASE_URL") {
            Some(raw) => Some(Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("AURORA_API_BASE_URL".to_string(), e.to_string())
            })?),
            None => None,
        };

        let prefs_path =
            PathBuf::from(get_env_or_default("STOREFRONT_PREFS_PATH", "storefront-prefs.json"));

        Ok(Self {
            host,
            port,
            api_base_override,
            prefs_path,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Resolve the backend base URL, once, at application start.
///
/// Precedence: explicit `AURORA_API_BASE_URL` override, then the local dev
/// backend if it answers a quick probe, then the remote deployment.
pub async fn resolve_api_base(config: &StorefrontConfig) -> Url {
    if let Some(url) = &config.api_base_override {
        tracing::info!(base = %url, "Using backend base URL from environment");
        return url.clone();
    }

    if probe_local_backend().await {
        tracing::info!(base = LOCAL_API_BASE, "Local backend answered, using it");
        parse_known_url(LOCAL_API_BASE)
    } else {
        tracing::info!(base = REMOTE_API_BASE, "No local backend, using remote deployment");
        parse_known_url(REMOTE_API_BASE)
    }
}

/// Ping the local dev backend with a short timeout.
async fn probe_local_backend() -> bool {
    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(c) => c,
        Err(_) => return false,
    };

    match client.get(LOCAL_API_BASE).send().await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(error = %e, "Local backend probe failed");
            false
        }
    }
}

/// Parse a compile-time constant URL.
fn parse_known_url(raw: &str) -> Url {
    Url::parse(raw).expect("hardcoded base URL is valid")
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_urls_parse() {
        assert_eq!(parse_known_url(LOCAL_API_BASE).as_str(), "http://localhost:4000/api");
        let remote = parse_known_url(REMOTE_API_BASE);
        assert_eq!(remote.scheme(), "https");
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            api_base_override: None,
            prefs_path: PathBuf::from("storefront-prefs.json"),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_retry_tuning_matches_backend_expectations() {
        // The backend is slow on cold starts; reads get a long timeout and
        // a small bounded number of retries.
        assert_eq!(REQUEST_TIMEOUT, Duration::from_secs(60));
        assert_eq!(MAX_RETRIES, 2);
    }
}
