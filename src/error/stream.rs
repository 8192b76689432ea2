//! Streaming-related error types.
//!
//! This module defines errors raised by the SSE reader: response
//! preconditions, transport failures mid-stream, timeouts, and aborts.

use std::fmt;

use crate::traits::HttpError;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The response is not declared as `text/event-stream`.
    InvalidContentType { content_type: Option<String> },

    /// The response has no readable body.
    MissingBody,

    /// The body failed while being read.
    ConnectionLost { message: String },

    /// No chunk arrived within the idle timeout.
    IdleTimeout { duration_secs: u64 },

    /// The stream ran longer than the total timeout.
    TotalTimeout { duration_secs: u64 },

    /// The caller cancelled the request.
    Aborted,
}

impl StreamError {
    /// Check if this error is a response precondition failure.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            StreamError::InvalidContentType { .. } | StreamError::MissingBody
        )
    }

    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StreamError::ConnectionLost { .. }
                | StreamError::IdleTimeout { .. }
                | StreamError::TotalTimeout { .. }
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::InvalidContentType { .. } | StreamError::MissingBody => {
                "The assistant sent an unexpected response. Please try again.".to_string()
            }
            StreamError::ConnectionLost { .. } => {
                "Connection to the server was lost before the reply finished.".to_string()
            }
            StreamError::IdleTimeout { duration_secs } => format!(
                "No response from the assistant for {} seconds. The connection may have been lost.",
                duration_secs
            ),
            StreamError::TotalTimeout { duration_secs } => format!(
                "The reply took longer than {} seconds and was stopped.",
                duration_secs
            ),
            StreamError::Aborted => "The request was cancelled.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::InvalidContentType { .. } => "E_STREAM_CONTENT_TYPE",
            StreamError::MissingBody => "E_STREAM_NO_BODY",
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
            StreamError::IdleTimeout { .. } => "E_STREAM_IDLE",
            StreamError::TotalTimeout { .. } => "E_STREAM_TIMEOUT",
            StreamError::Aborted => "E_STREAM_ABORT",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::InvalidContentType { content_type } => match content_type {
                Some(ct) => write!(f, "Expected text/event-stream, got '{}'", ct),
                None => write!(f, "Expected text/event-stream, got no content type"),
            },
            StreamError::MissingBody => write!(f, "Response has no readable body"),
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
            StreamError::IdleTimeout { duration_secs } => {
                write!(f, "Stream idle for {} seconds", duration_secs)
            }
            StreamError::TotalTimeout { duration_secs } => {
                write!(f, "Stream exceeded {} seconds", duration_secs)
            }
            StreamError::Aborted => write!(f, "Stream aborted"),
        }
    }
}

impl std::error::Error for StreamError {}

impl From<HttpError> for StreamError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Cancelled => StreamError::Aborted,
            other => StreamError::ConnectionLost {
                message: other.to_string(),
            },
        }
    }
}
