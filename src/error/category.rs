//! Error category classification.
//!
//! Categories drive how a failed chat request is surfaced: inline in the
//! transcript, as a global notification, or not at all.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS, timeout, dropped stream.
    Network,

    /// Missing or rejected credentials.
    Auth,

    /// Backend quota exceeded.
    RateLimit,

    /// Backend errors (HTTP 5xx and other non-2xx statuses).
    Server,

    /// The response was not a usable event stream.
    Protocol,

    /// The caller aborted the request.
    Cancelled,
}

impl ErrorCategory {
    /// Returns true if a manual retry is likely to succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCategory::Network | ErrorCategory::Server | ErrorCategory::RateLimit
        )
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::RateLimit => "rate_limit",
            ErrorCategory::Server => "server",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Cancelled => "cancelled",
        }
    }

    /// Returns a user-friendly description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network connectivity issue",
            ErrorCategory::Auth => "Authentication problem",
            ErrorCategory::RateLimit => "Usage limit reached",
            ErrorCategory::Server => "Server-side issue",
            ErrorCategory::Protocol => "Unexpected server response",
            ErrorCategory::Cancelled => "Request cancelled",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check your internet connection and send the message again",
            ErrorCategory::Auth => "Sign in again to continue the conversation",
            ErrorCategory::RateLimit => "Wait a little while before sending another message",
            ErrorCategory::Server => {
                "The assistant may be experiencing issues. Please try again later"
            }
            ErrorCategory::Protocol => "This may be a bug. Please report this issue if it persists",
            ErrorCategory::Cancelled => "Send the message again to get a reply",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
