//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `POINTS_MALL_BASE_URL` - Backend origin (default: `http://127.0.0.1:8080`)
//! - `POINTS_MALL_API_PREFIX` - Path prefix for every API request (default: `/api`)
//! - `POINTS_MALL_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `POINTS_MALL_STORAGE_PATH` - File backing the persistent store
//!   (default: `.points-mall/storage.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_API_PREFIX: &str = "/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STORAGE_PATH: &str = ".points-mall/storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Points Mall client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, e.g. `https://mall.example.com`
    pub base_url: Url,
    /// Path prefix prepended to every API path
    pub api_prefix: String,
    /// Per-request timeout; expiry is reported as a network failure
    pub timeout: Duration,
    /// File backing the persistent key-value store
    pub storage_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Configuration for the given backend with every other setting defaulted.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = get_or_default(&lookup, "POINTS_MALL_BASE_URL", DEFAULT_BASE_URL);
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("POINTS_MALL_BASE_URL".to_string(), e.to_string())
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "POINTS_MALL_BASE_URL".to_string(),
                "must be an absolute http(s) URL".to_string(),
            ));
        }

        let api_prefix = normalize_prefix(&get_or_default(
            &lookup,
            "POINTS_MALL_API_PREFIX",
            DEFAULT_API_PREFIX,
        ));

        let timeout_secs = get_or_default(
            &lookup,
            "POINTS_MALL_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("POINTS_MALL_TIMEOUT_SECS".to_string(), e.to_string())
        })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "POINTS_MALL_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let storage_path = PathBuf::from(get_or_default(
            &lookup,
            "POINTS_MALL_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));

        Ok(Self {
            base_url,
            api_prefix,
            timeout: Duration::from_secs(timeout_secs),
            storage_path,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }

    /// Returns a copy of this configuration with another request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Ensure the prefix has exactly one leading slash and no trailing slash.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
