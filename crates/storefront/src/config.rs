//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `QKART_API_URL` - Base URL of the commerce API (e.g. `http://localhost:8082/api/v1`)
//!
//! ## Optional
//! - `QKART_SEARCH_DEBOUNCE_MS` - Quiet period before a search is sent (default: 500)
//! - `QKART_HTTP_TIMEOUT_SECS` - Request timeout (default: 30)
//! - `QKART_SESSION_PATH` - Where the session token is kept (default: .qkart/session.json)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Name of the variable holding the backend base URL.
pub const API_URL_VAR: &str = "QKART_API_URL";

const DEFAULT_SEARCH_DEBOUNCE_MS: &str = "500";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "30";
const DEFAULT_SESSION_PATH: &str = ".qkart/session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Commerce API base URL, always ending in `/`
    pub api_url: Url,
    /// Quiet period the search debouncer waits for
    pub search_debounce: Duration,
    /// Per-request timeout for backend calls
    pub http_timeout: Duration,
    /// Location of the persisted session
    pub session_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Configuration for `api_url` with every optional setting at its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not an absolute
    /// `http`/`https` URL.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| (key == API_URL_VAR).then(|| api_url.to_string()))
    }

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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Lookup(lookup);

        let api_url = parse_base_url(&env.required(API_URL_VAR)?)?;
        let search_debounce = Duration::from_millis(
            env.parsed("QKART_SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS)?,
        );
        let http_timeout =
            Duration::from_secs(env.parsed("QKART_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?);
        let session_path = PathBuf::from(env.or_default("QKART_SESSION_PATH", DEFAULT_SESSION_PATH));

        Ok(Self {
            api_url,
            search_debounce,
            http_timeout,
            session_path,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Lookup<F>(F);

impl<F: Fn(&str) -> Option<String>> Lookup<F> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a variable with a default value and parse it.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Parse the API base URL and make sure relative joins append to its path.
///
/// `Url::join("products")` on `http://host/api/v1` would replace `v1`, so the
/// path is given a trailing slash.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar(API_URL_VAR.to_string(), reason);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("cannot be used as a base URL".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_map(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_missing_api_url() {
        let err = from_map(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == API_URL_VAR));
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[(API_URL_VAR, "http://localhost:8082/api/v1")]).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8082/api/v1/");
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.session_path, PathBuf::from(".qkart/session.json"));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = from_map(&[
            (API_URL_VAR, "https://qkart.example/api/v1/"),
            ("QKART_SEARCH_DEBOUNCE_MS", "250"),
            ("QKART_HTTP_TIMEOUT_SECS", "5"),
            ("QKART_SESSION_PATH", "/tmp/qkart.json"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ])
        .unwrap();

        assert_eq!(config.api_url.as_str(), "https://qkart.example/api/v1/");
        assert_eq!(config.search_debounce, Duration::from_millis(250));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.session_path, PathBuf::from("/tmp/qkart.json"));
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_invalid_debounce() {
        let err = from_map(&[
            (API_URL_VAR, "http://localhost:8082"),
            ("QKART_SEARCH_DEBOUNCE_MS", "soon"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "QKART_SEARCH_DEBOUNCE_MS"));
    }

    #[test]
    fn test_base_url_validation() {
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("ftp://files.example/").is_err());
        assert!(parse_base_url("mailto:someone@example.com").is_err());

        let url = parse_base_url("http://localhost:8082?debug=1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8082/");
    }

    #[test]
    fn test_base_url_joins_append() {
        let url = parse_base_url("http://localhost:8082/api/v1").unwrap();
        assert_eq!(
            url.join("products/search").unwrap().as_str(),
            "http://localhost:8082/api/v1/products/search"
        );
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = StorefrontConfig::new("http://127.0.0.1:9000").unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.search_debounce, Duration::from_millis(500));
    }
}
