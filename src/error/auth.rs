//! Authentication-related error types.
//!
//! This module defines errors raised before or while calling a chat type
//! that requires a signed-in user.

use std::fmt;

use crate::traits::CredentialsError;

/// Message shown in the transcript when a gated assistant is used signed out.
pub const AUTH_REQUIRED_MESSAGE: &str =
    "Authentication required. Please sign in to chat with this assistant.";

/// Authentication-specific error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No token is stored (user not signed in).
    NotAuthenticated,

    /// The token store could not be read.
    CredentialsLoadFailed { message: String },

    /// The backend rejected the token (HTTP 401/403).
    ApiError { status: u16, message: String },
}

impl AuthError {
    /// Check if this error might be resolved by signing in again.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            AuthError::NotAuthenticated
                | AuthError::CredentialsLoadFailed { .. }
                | AuthError::ApiError { status: 401, .. }
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::NotAuthenticated => AUTH_REQUIRED_MESSAGE.to_string(),
            AuthError::CredentialsLoadFailed { .. } => {
                "Authentication required. Your saved sign-in could not be read; please sign in again."
                    .to_string()
            }
            AuthError::ApiError { status, message } => match *status {
                401 => "Your session has expired. Please sign in again.".to_string(),
                403 => "Access denied. Your account cannot use this assistant.".to_string(),
                _ => format!("Authentication error: {}", message),
            },
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::NotAuthenticated => "E_AUTH_NONE",
            AuthError::CredentialsLoadFailed { .. } => "E_AUTH_LOAD",
            AuthError::ApiError { .. } => "E_AUTH_API",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NotAuthenticated => write!(f, "Not authenticated"),
            AuthError::CredentialsLoadFailed { message } => {
                write!(f, "Failed to load credentials: {}", message)
            }
            AuthError::ApiError { status, message } => {
                write!(f, "Auth API error ({}): {}", status, message)
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl From<CredentialsError> for AuthError {
    fn from(err: CredentialsError) -> Self {
        AuthError::CredentialsLoadFailed {
            message: err.to_string(),
        }
    }
}
