//! In-memory credential provider for testing.
//!
//! Holds an optional token in memory, allowing tests to exercise the
//! signed-in, signed-out, and unreadable-store paths without touching the
//! file system.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::auth::AuthToken;
use crate::traits::{CredentialProvider, CredentialsError};

/// In-memory credential provider for testing.
///
/// # Example
///
/// ```ignore
/// use chairside::adapters::mock::InMemoryCredentials;
/// use chairside::auth::AuthToken;
///
/// let provider = InMemoryCredentials::with_token(AuthToken::bearer("test-token"));
/// assert!(provider.get_token().await?.is_some());
///
/// provider.clear();
/// assert!(provider.get_token().await?.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentials {
    /// Stored token
    token: Arc<Mutex<Option<AuthToken>>>,
    /// Whether get_token should fail
    load_should_fail: Arc<Mutex<bool>>,
    /// Number of get_token calls
    load_count: Arc<Mutex<usize>>,
}

impl InMemoryCredentials {
    /// Create a signed-out provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider holding `token`.
    pub fn with_token(token: AuthToken) -> Self {
        let provider = Self::new();
        provider.set_token(token);
        provider
    }

    /// Replace the stored token.
    pub fn set_token(&self, token: AuthToken) {
        *self.token.lock().unwrap() = Some(token);
    }

    /// Remove the stored token.
    pub fn clear(&self) {
        *self.token.lock().unwrap() = None;
    }

    /// Configure whether get_token should fail.
    pub fn set_load_should_fail(&self, should_fail: bool) {
        *self.load_should_fail.lock().unwrap() = should_fail;
    }

    /// Number of times the token was requested.
    pub fn load_count(&self) -> usize {
        *self.load_count.lock().unwrap()
    }
}

#[async_trait]
impl CredentialProvider for InMemoryCredentials {
    async fn get_token(&self) -> Result<Option<AuthToken>, CredentialsError> {
        *self.load_count.lock().unwrap() += 1;

        if *self.load_should_fail.lock().unwrap() {
            return Err(CredentialsError::LoadFailed(
                "Mock load failure".to_string(),
            ));
        }

        Ok(self.token.lock().unwrap().clone())
    }
}
