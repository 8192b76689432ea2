//! Client configuration.
//!
//! Values come from code (builder methods) or from the environment:
//!
//! | variable | meaning | default |
//! |---|---|---|
//! | `CHAIRSIDE_API_URL` | backend base URL | `http://localhost:8080` |
//! | `CHAIRSIDE_IDLE_TIMEOUT_SECS` | max silence between chunks, `0` disables | 60 |
//! | `CHAIRSIDE_TOTAL_TIMEOUT_SECS` | max stream duration, `0` disables | 300 |
//! | `CHAIRSIDE_CONNECT_TIMEOUT_SECS` | TCP/TLS connect timeout | 10 |

use std::time::Duration;

use thiserror::Error;

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default maximum gap between two body chunks.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default maximum duration of one stream.
pub const DEFAULT_TOTAL_TIMEOUT: Duration = Duration::from_secs(300);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_API_URL: &str = "CHAIRSIDE_API_URL";
pub const ENV_IDLE_TIMEOUT: &str = "CHAIRSIDE_IDLE_TIMEOUT_SECS";
pub const ENV_TOTAL_TIMEOUT: &str = "CHAIRSIDE_TOTAL_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT: &str = "CHAIRSIDE_CONNECT_TIMEOUT_SECS";
/// Log filter; `RUST_LOG` is used when unset.
pub const ENV_LOG: &str = "CHAIRSIDE_LOG";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid value for {var}: '{value}' is not a whole number of seconds")]
    InvalidSeconds { var: &'static str, value: String },
}

/// Settings shared by the HTTP client and the SSE reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash
    pub base_url: String,
    /// Max silence between chunks, `None` for no limit
    pub idle_timeout: Option<Duration>,
    /// Max duration of one stream, `None` for no limit
    pub total_timeout: Option<Duration>,
    /// Connect timeout for new connections
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
            total_timeout: Some(DEFAULT_TOTAL_TIMEOUT),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the backend base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder method to set the idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Builder method to set the total stream timeout.
    pub fn with_total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = Some(timeout);
        self
    }

    /// Builder method to remove both stream timeouts.
    pub fn without_timeouts(mut self) -> Self {
        self.idle_timeout = None;
        self.total_timeout = None;
        self
    }

    /// Builder method to set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset or empty variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            config = config.with_base_url(url.trim());
        }
        if let Some(value) = get(ENV_IDLE_TIMEOUT) {
            config.idle_timeout = parse_optional_seconds(ENV_IDLE_TIMEOUT, &value)?;
        }
        if let Some(value) = get(ENV_TOTAL_TIMEOUT) {
            config.total_timeout = parse_optional_seconds(ENV_TOTAL_TIMEOUT, &value)?;
        }
        if let Some(value) = get(ENV_CONNECT_TIMEOUT) {
            config.connect_timeout = parse_seconds(ENV_CONNECT_TIMEOUT, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(())
    }

    /// Full URL for an endpoint path such as `/genai/chatbot/help`.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn parse_seconds(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidSeconds {
            var,
            value: value.to_string(),
        })
}

/// Like [`parse_seconds`], with `0` meaning "no limit".
fn parse_optional_seconds(var: &'static str, value: &str) -> Result<Option<Duration>, ConfigError> {
    let duration = parse_seconds(var, value)?;
    Ok((!duration.is_zero()).then_some(duration))
}
