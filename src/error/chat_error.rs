//! Unified error type for chat requests.
//!
//! `ChatError` wraps the domain errors a single chat request can end with
//! and answers the questions the chat service asks when surfacing them:
//! which category, whether it was a rate limit, whether the user aborted.

use std::fmt;

use super::auth::AuthError;
use super::category::ErrorCategory;
use super::network::{is_rate_limit_message, NetworkError};
use super::stream::StreamError;
use crate::traits::{CredentialsError, HttpError};

/// Result type alias for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Unified error type for chat requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Transport failures and non-2xx responses.
    Network(NetworkError),

    /// Missing or rejected credentials.
    Auth(AuthError),

    /// SSE reader failures.
    Stream(StreamError),
}

impl ChatError {
    /// Classify a non-2xx response.
    ///
    /// 401/403 are authentication failures, everything else goes through
    /// [`NetworkError::from_status`].
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let message = body.into();
        match status {
            401 | 403 => ChatError::Auth(AuthError::ApiError { status, message }),
            _ => ChatError::Network(NetworkError::from_status(status, message)),
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        if self.is_rate_limited() {
            return ErrorCategory::RateLimit;
        }
        match self {
            ChatError::Network(NetworkError::Cancelled) => ErrorCategory::Cancelled,
            ChatError::Network(NetworkError::HttpStatus { .. }) => ErrorCategory::Server,
            ChatError::Network(NetworkError::InvalidRequest { .. }) => ErrorCategory::Protocol,
            ChatError::Network(_) => ErrorCategory::Network,
            ChatError::Auth(_) => ErrorCategory::Auth,
            ChatError::Stream(StreamError::Aborted) => ErrorCategory::Cancelled,
            ChatError::Stream(err) if err.is_precondition() => ErrorCategory::Protocol,
            ChatError::Stream(_) => ErrorCategory::Network,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Network(err) => err.is_retryable(),
            ChatError::Auth(_) => false,
            ChatError::Stream(err) => err.is_retryable(),
        }
    }

    /// Check if the caller cancelled the request.
    pub fn is_aborted(&self) -> bool {
        matches!(
            self,
            ChatError::Stream(StreamError::Aborted) | ChatError::Network(NetworkError::Cancelled)
        )
    }

    /// Check if the backend refused the request because of its quota.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ChatError::Network(err) => err.is_rate_limited(),
            ChatError::Stream(StreamError::ConnectionLost { message }) => {
                is_rate_limit_message(message)
            }
            _ => false,
        }
    }

    /// The backend's rate-limit wording, when this is a rate limit.
    pub fn rate_limit_message(&self) -> Option<String> {
        if !self.is_rate_limited() {
            return None;
        }
        match self {
            ChatError::Network(NetworkError::RateLimited { .. }) => {
                Some(self.user_message())
            }
            ChatError::Network(NetworkError::HttpStatus { message, .. })
            | ChatError::Network(NetworkError::Other { message })
            | ChatError::Stream(StreamError::ConnectionLost { message }) => {
                Some(message.trim().to_string())
            }
            _ => Some(self.user_message()),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Network(err) => err.user_message(),
            ChatError::Auth(err) => err.user_message(),
            ChatError::Stream(err) => err.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ChatError::Network(err) => err.error_code(),
            ChatError::Auth(err) => err.error_code(),
            ChatError::Stream(err) => err.error_code(),
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Network(err) => write!(f, "{}", err),
            ChatError::Auth(err) => write!(f, "{}", err),
            ChatError::Stream(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatError::Network(err) => Some(err),
            ChatError::Auth(err) => Some(err),
            ChatError::Stream(err) => Some(err),
        }
    }
}

impl From<NetworkError> for ChatError {
    fn from(err: NetworkError) -> Self {
        ChatError::Network(err)
    }
}

impl From<AuthError> for ChatError {
    fn from(err: AuthError) -> Self {
        ChatError::Auth(err)
    }
}

impl From<StreamError> for ChatError {
    fn from(err: StreamError) -> Self {
        ChatError::Stream(err)
    }
}

impl From<HttpError> for ChatError {
    fn from(err: HttpError) -> Self {
        ChatError::Network(NetworkError::from(err))
    }
}

impl From<CredentialsError> for ChatError {
    fn from(err: CredentialsError) -> Self {
        ChatError::Auth(AuthError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_auth() {
        let err = ChatError::from_status(401, "token expired");
        assert_eq!(err.category(), ErrorCategory::Auth);
        assert!(matches!(err, ChatError::Auth(AuthError::ApiError { status: 401, .. })));
    }

    #[test]
    fn test_from_status_rate_limit_verbatim() {
        let err = ChatError::from_status(429, "Daily quota exceeded for the triage assistant");
        assert_eq!(err.category(), ErrorCategory::RateLimit);
        assert_eq!(
            err.rate_limit_message().as_deref(),
            Some("Daily quota exceeded for the triage assistant")
        );
    }

    #[test]
    fn test_rate_limit_phrase_in_stream_error() {
        let err = ChatError::Stream(StreamError::ConnectionLost {
            message: "upstream: rate limit exceeded".to_string(),
        });
        assert!(err.is_rate_limited());
        assert_eq!(
            err.rate_limit_message().as_deref(),
            Some("upstream: rate limit exceeded")
        );
    }

    #[test]
    fn test_server_error_not_rate_limited() {
        let err = ChatError::from_status(500, "Internal Server Error");
        assert_eq!(err.category(), ErrorCategory::Server);
        assert!(!err.is_rate_limited());
        assert_eq!(err.rate_limit_message(), None);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_aborted() {
        let err: ChatError = StreamError::Aborted.into();
        assert!(err.is_aborted());
        assert_eq!(err.category(), ErrorCategory::Cancelled);

        let err: ChatError = HttpError::Cancelled.into();
        assert!(err.is_aborted());
    }

    #[test]
    fn test_precondition_is_protocol() {
        let err: ChatError = StreamError::MissingBody.into();
        assert_eq!(err.category(), ErrorCategory::Protocol);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_from_credentials_error() {
        let err: ChatError = CredentialsError::Io("denied".to_string()).into();
        assert_eq!(err.category(), ErrorCategory::Auth);
        assert_eq!(err.error_code(), "E_AUTH_LOAD");
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;
        let err: ChatError = AuthError::NotAuthenticated.into();
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Not authenticated");
    }

    #[test]
    fn test_recovery_hint() {
        let err: ChatError = NetworkError::Timeout {
            message: "30s".to_string(),
        }
        .into();
        assert!(err.recovery_hint().contains("internet connection"));
    }
}
