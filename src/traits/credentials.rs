//! Credential provider trait abstraction.
//!
//! The chat service never reads token storage directly; it asks an injected
//! provider, so tests can run without touching the filesystem.

use async_trait::async_trait;

use crate::auth::AuthToken;

/// Credentials operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    /// Failed to load credentials
    LoadFailed(String),
    /// IO error
    Io(String),
    /// Deserialization error
    Serialization(String),
    /// Other error
    Other(String),
}

impl std::fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialsError::LoadFailed(msg) => write!(f, "Failed to load credentials: {}", msg),
            CredentialsError::Io(msg) => write!(f, "IO error: {}", msg),
            CredentialsError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            CredentialsError::Other(msg) => write!(f, "Credentials error: {}", msg),
        }
    }
}

impl std::error::Error for CredentialsError {}

impl From<std::io::Error> for CredentialsError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::InvalidData {
            CredentialsError::Serialization(err.to_string())
        } else {
            CredentialsError::Io(err.to_string())
        }
    }
}

/// Source of the current user's access token.
///
/// # Example
///
/// ```ignore
/// use chairside::traits::CredentialProvider;
///
/// async fn signed_in<P: CredentialProvider>(provider: &P) -> bool {
///     matches!(provider.get_token().await, Ok(Some(_)))
/// }
/// ```
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Get the stored token.
    ///
    /// # Returns
    /// - `Ok(Some(token))` if a token is stored
    /// - `Ok(None)` if the user is not signed in
    /// - `Err(error)` if the store could not be read
    async fn get_token(&self) -> Result<Option<AuthToken>, CredentialsError>;
}
