//! Error handling for chat requests.
//!
//! - **Error Categories**: high-level classification that decides how a
//!   failure is surfaced
//! - **Domain-specific Errors**: Network, Auth, and Stream errors
//! - **Unified Error Type**: `ChatError` consolidates them
//! - **Result Type Alias**: `ChatResult<T>`
//!
//! # Error Categories
//!
//! | Category | Description | Surfaced as |
//! |----------|-------------|-------------|
//! | Network | Connection, DNS, timeout, dropped stream | apology + snackbar |
//! | Server | Non-2xx responses | apology + snackbar |
//! | Protocol | Not an event stream | apology + snackbar |
//! | Auth | Not signed in, token rejected | message + snackbar |
//! | RateLimit | Quota exceeded | backend wording + snackbar |
//! | Cancelled | Caller aborted | nothing |

mod auth;
mod category;
mod chat_error;
mod network;
mod stream;

pub use auth::{AuthError, AUTH_REQUIRED_MESSAGE};
pub use category::ErrorCategory;
pub use chat_error::{ChatError, ChatResult};
pub use network::{is_rate_limit_message, NetworkError};
pub use stream::StreamError;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_error_unification() {
        let errors: Vec<ChatError> = vec![
            NetworkError::ConnectionFailed {
                url: "http://localhost:8080".to_string(),
                message: "refused".to_string(),
            }
            .into(),
            AuthError::NotAuthenticated.into(),
            StreamError::MissingBody.into(),
            NetworkError::from_status(429, "Too many requests").into(),
        ];

        let categories: Vec<ErrorCategory> = errors.iter().map(ChatError::category).collect();
        assert_eq!(
            categories,
            vec![
                ErrorCategory::Network,
                ErrorCategory::Auth,
                ErrorCategory::Protocol,
                ErrorCategory::RateLimit,
            ]
        );

        for err in &errors {
            assert!(!err.user_message().is_empty());
            assert!(err.error_code().starts_with("E_"));
        }
    }

    #[test]
    fn test_chat_result_with_question_mark() {
        fn load() -> ChatResult<()> {
            Err(AuthError::NotAuthenticated)?
        }
        let err = load().unwrap_err();
        assert!(err.user_message().contains("Authentication required"));
    }
}
