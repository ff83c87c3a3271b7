//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STORE_API_BASE_URL` - Catalog API origin (default: `https://api.escuelajs.co`)
//! - `STORE_API_TOKEN` - Bearer token sent with catalog write requests
//! - `STORE_USER_FILE` - Path of the signed-in user snapshot (default: `.onlinestore/user.json`)
//! - `STORE_SYNC_INTERVAL_MS` - User record poll interval (default: 1000)
//! - `STORE_SYNC_MAX_BACKOFF_MS` - Poll delay ceiling after failures (default: 30000)
//! - `STORE_CATALOG_CACHE_TTL_SECS` - Catalog response cache TTL (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "https://api.escuelajs.co";
const DEFAULT_USER_FILE: &str = ".onlinestore/user.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Catalog API settings
    pub catalog: CatalogConfig,
    /// Session sync loop settings
    pub sync: SyncConfig,
    /// Where the signed-in user record is persisted
    pub user_file: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Catalog API configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// API origin; endpoints live under `/api/v1`
    pub base_url: Url,
    /// Bearer token for create/update/delete requests
    pub api_token: Option<SecretString>,
    /// How long catalog reads stay cached
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl CatalogConfig {
    /// Catalog settings for `base_url` with no token and the default TTL.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            cache_ttl: Duration::from_secs(300),
        }
    }
}

/// User record sync loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Delay between polls while the store is reachable
    pub interval: Duration,
    /// Upper bound for the delay after consecutive failures
    pub max_backoff: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but cannot be
    /// parsed, or if the sync intervals are inconsistent.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = Url::parse(&get_env_or_default("STORE_API_BASE_URL", DEFAULT_API_BASE_URL))
            .map_err(|e| ConfigError::InvalidEnvVar("STORE_API_BASE_URL".to_string(), e.to_string()))?;
        let api_token = get_optional_env("STORE_API_TOKEN").map(SecretString::from);
        let cache_ttl = Duration::from_secs(parse_env_or("STORE_CATALOG_CACHE_TTL_SECS", 300)?);

        let sync = SyncConfig {
            interval: Duration::from_millis(parse_env_or("STORE_SYNC_INTERVAL_MS", 1000)?),
            max_backoff: Duration::from_millis(parse_env_or("STORE_SYNC_MAX_BACKOFF_MS", 30_000)?),
        };
        validate_sync(&sync)?;

        Ok(Self {
            catalog: CatalogConfig {
                base_url,
                api_token,
                cache_ttl,
            },
            sync,
            user_file: PathBuf::from(get_env_or_default("STORE_USER_FILE", DEFAULT_USER_FILE)),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Validate that the sync loop settings are usable.
fn validate_sync(sync: &SyncConfig) -> Result<(), ConfigError> {
    if sync.interval.is_zero() {
        return Err(ConfigError::InvalidEnvVar(
            "STORE_SYNC_INTERVAL_MS".to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    if sync.max_backoff < sync.interval {
        return Err(ConfigError::InvalidEnvVar(
            "STORE_SYNC_MAX_BACKOFF_MS".to_string(),
            format!(
                "must be at least the sync interval ({} ms)",
                sync.interval.as_millis()
            ),
        ));
    }
    Ok(())
}
