//! Network-related error types.
//!
//! This module defines errors that occur while sending a chat request:
//! transport failures, non-2xx responses, and backend rate limiting.

use std::fmt;

use crate::traits::HttpError;

/// Phrases the backend uses when a caller has exceeded their quota.
///
/// Generic wording such as "limit exceeded" is left out: validation errors
/// like a message length limit use it too.
const RATE_LIMIT_PHRASES: [&str; 3] = ["rate limit", "too many requests", "quota exceeded"];

const DEFAULT_RATE_LIMIT_MESSAGE: &str = "Too many requests. Please wait a moment and try again.";

/// Check whether an error message reports rate limiting.
pub fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    RATE_LIMIT_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Network-specific error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Connection to the server failed.
    ConnectionFailed { url: String, message: String },

    /// DNS resolution failed.
    DnsResolutionFailed { host: String },

    /// Request timed out before a response arrived.
    Timeout { message: String },

    /// TLS/SSL error.
    TlsError { message: String },

    /// HTTP status error (non-2xx response).
    HttpStatus { status: u16, message: String },

    /// The backend refused the request because of its quota.
    ///
    /// `message` is the backend's own wording and is shown to the user as-is.
    RateLimited {
        message: Option<String>,
        retry_after_secs: Option<u64>,
    },

    /// The request could not be built (bad URL, bad header).
    InvalidRequest { message: String },

    /// Request was cancelled.
    Cancelled,

    /// Generic network error.
    Other { message: String },
}

impl NetworkError {
    /// Classify a non-2xx response by status code and body text.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let message = body.into();
        if status == 429 || is_rate_limit_message(&message) {
            let message = message.trim();
            NetworkError::RateLimited {
                message: (!message.is_empty()).then(|| message.to_string()),
                retry_after_secs: None,
            }
        } else {
            NetworkError::HttpStatus { status, message }
        }
    }

    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::DnsResolutionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::TlsError { .. } => false,
            NetworkError::HttpStatus { status, .. } => *status >= 500 || *status == 408,
            NetworkError::RateLimited { .. } => true,
            NetworkError::InvalidRequest { .. } => false,
            NetworkError::Cancelled => false,
            NetworkError::Other { .. } => false,
        }
    }

    /// Check if this error reports rate limiting, by variant or by wording.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            NetworkError::RateLimited { .. } => true,
            NetworkError::HttpStatus { message, .. } | NetworkError::Other { message } => {
                is_rate_limit_message(message)
            }
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Unable to connect to the server. Please check your internet connection.".to_string()
            }
            NetworkError::DnsResolutionFailed { host } => {
                format!(
                    "Could not resolve server address '{}'. Please check your internet connection.",
                    host
                )
            }
            NetworkError::Timeout { .. } => {
                "The request timed out. The server may be slow or unreachable.".to_string()
            }
            NetworkError::TlsError { .. } => {
                "A secure connection could not be established.".to_string()
            }
            NetworkError::HttpStatus { status, .. } => match *status {
                400 => "The request was invalid. Please try again.".to_string(),
                404 => "The assistant is not available right now.".to_string(),
                500..=599 => {
                    "The server is experiencing issues. Please try again later.".to_string()
                }
                _ => format!(
                    "The server returned an error (HTTP {}). Please try again.",
                    status
                ),
            },
            NetworkError::RateLimited {
                message,
                retry_after_secs,
            } => match (message, retry_after_secs) {
                (Some(message), _) => message.clone(),
                (None, Some(secs)) => format!(
                    "Too many requests. Please wait {} seconds before trying again.",
                    secs
                ),
                (None, None) => DEFAULT_RATE_LIMIT_MESSAGE.to_string(),
            },
            NetworkError::InvalidRequest { .. } => {
                "The request could not be sent. Please check the client configuration.".to_string()
            }
            NetworkError::Cancelled => "The request was cancelled.".to_string(),
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::DnsResolutionFailed { .. } => "E_NET_DNS",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::TlsError { .. } => "E_NET_TLS",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::RateLimited { .. } => "E_NET_RATE",
            NetworkError::InvalidRequest { .. } => "E_NET_REQUEST",
            NetworkError::Cancelled => "E_NET_CANCEL",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::DnsResolutionFailed { host } => {
                write!(f, "DNS resolution failed for '{}'", host)
            }
            NetworkError::Timeout { message } => write!(f, "Request timed out: {}", message),
            NetworkError::TlsError { message } => write!(f, "TLS error: {}", message),
            NetworkError::HttpStatus { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            NetworkError::RateLimited {
                message,
                retry_after_secs,
            } => {
                write!(f, "Rate limited")?;
                if let Some(secs) = retry_after_secs {
                    write!(f, ", retry after {} seconds", secs)?;
                }
                if let Some(message) = message {
                    write!(f, ": {}", message)?;
                }
                Ok(())
            }
            NetworkError::InvalidRequest { message } => write!(f, "Invalid request: {}", message),
            NetworkError::Cancelled => write!(f, "Request cancelled"),
            NetworkError::Other { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<HttpError> for NetworkError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ConnectionFailed { url, message } => {
                match host_of_url(&url).filter(|_| mentions_dns_failure(&message)) {
                    Some(host) => NetworkError::DnsResolutionFailed { host },
                    None => NetworkError::ConnectionFailed { url, message },
                }
            }
            HttpError::Timeout(message) => NetworkError::Timeout { message },
            HttpError::Cancelled => NetworkError::Cancelled,
            HttpError::InvalidUrl(message) => NetworkError::InvalidRequest { message },
            HttpError::Io(message) | HttpError::Other(message) => {
                let lower = message.to_lowercase();
                if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate")
                {
                    NetworkError::TlsError { message }
                } else if let Some(host) =
                    host_in_message(&message).filter(|_| mentions_dns_failure(&message))
                {
                    NetworkError::DnsResolutionFailed { host }
                } else {
                    NetworkError::Other { message }
                }
            }
        }
    }
}

fn mentions_dns_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("dns") || lower.contains("resolve") || lower.contains("lookup address")
}

fn host_of_url(url: &str) -> Option<String> {
    reqwest::Url::parse(url)
        .ok()?
        .host_str()
        .map(str::to_string)
}

/// Host of the first `scheme://host` URL quoted in a transport error message.
fn host_in_message(message: &str) -> Option<String> {
    let (_, rest) = message.split_once("://")?;
    let host: String = rest
        .chars()
        .take_while(|c| !matches!(c, '/' | ':' | '?' | '#' | ')') && !c.is_whitespace())
        .collect();
    (!host.is_empty()).then_some(host)
}
