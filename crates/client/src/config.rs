//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `STORELET_ENV` - Build environment: `development`, `staging` or `production` (default: development)
//! - `STORELET_API_BASE_URL` - Overrides the environment's API base URL
//! - `STORELET_TIMEOUT_MS` - Request timeout in milliseconds (default: 10000)
//! - `STORELET_STORAGE_PATH` - JSON file backing device storage (default: in-memory)
//! - `STORELET_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `STORELET_API_KEY` - Static API key sent as `x-api-key`

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Build environment. Selects the default API base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn default_base_url(&self) -> &'static str {
        match self {
            Self::Development => "http://localhost:8080/api",
            Self::Staging => "https://staging-api.storelet.app/api",
            Self::Production => "https://api.storelet.app/api",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "staging" | "test" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Storelet client configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api_base_url: Url,
    pub timeout: Duration,
    /// `None` keeps device storage in memory.
    pub storage_path: Option<PathBuf>,
    pub log_format: LogFormat,
    pub api_key: Option<SecretString>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("environment", &self.environment)
            .field("api_base_url", &self.api_base_url.as_str())
            .field("timeout", &self.timeout)
            .field("storage_path", &self.storage_path)
            .field("log_format", &self.log_format)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ClientConfig {
    /// Defaults for `environment`, with no storage file and no API key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the environment's base URL does not parse.
    pub fn for_environment(environment: Environment) -> Result<Self, ConfigError> {
        Ok(Self {
            environment,
            api_base_url: parse_url("STORELET_ENV", environment.default_base_url())?,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            storage_path: None,
            log_format: LogFormat::default(),
            api_key: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = parse_optional::<Environment>(&lookup, "STORELET_ENV")?.unwrap_or_default();
        let mut config = Self::for_environment(environment)?;

        if let Some(raw) = lookup("STORELET_API_BASE_URL") {
            config.api_base_url = parse_url("STORELET_API_BASE_URL", &raw)?;
        }
        if let Some(ms) = parse_optional::<u64>(&lookup, "STORELET_TIMEOUT_MS")? {
            if ms == 0 {
                return Err(ConfigError::InvalidEnvVar(
                    "STORELET_TIMEOUT_MS".to_string(),
                    "must be greater than zero".to_string(),
                ));
            }
            config.timeout = Duration::from_millis(ms);
        }
        config.storage_path = lookup("STORELET_STORAGE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        config.log_format = parse_optional::<LogFormat>(&lookup, "STORELET_LOG_FORMAT")?.unwrap_or_default();
        config.api_key = lookup("STORELET_API_KEY")
            .filter(|k| !k.is_empty())
            .map(SecretString::from);

        Ok(config)
    }

    /// Headers every request carries on top of the JSON content type.
    #[must_use]
    pub fn default_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        if let Some(key) = &self.api_key {
            headers.insert(API_KEY_HEADER.to_string(), key.expose_secret().to_string());
        }
        headers
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, reporting the variable name on failure.
fn parse_optional<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
