//! File-based credential provider adapter.
//!
//! Wraps [`CredentialsStore`] and implements the [`CredentialProvider`]
//! trait. The file is re-read on every call so a sign-in from another
//! process is picked up without a restart.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::auth::{AuthToken, CredentialsStore};
use crate::traits::{CredentialProvider, CredentialsError};

/// File-based credential provider.
///
/// Credentials are read from `~/.chairside/credentials.json` unless a path
/// is given explicitly.
///
/// # Example
///
/// ```ignore
/// use chairside::adapters::FileCredentialProvider;
/// use chairside::traits::CredentialProvider;
///
/// let provider = FileCredentialProvider::new()?;
/// if provider.get_token().await?.is_none() {
///     println!("Not signed in");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialProvider {
    store: CredentialsStore,
}

impl FileCredentialProvider {
    /// Create a provider for the default credentials file.
    ///
    /// # Returns
    /// The provider, or an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, CredentialsError> {
        CredentialsStore::new()
            .map(|store| Self { store })
            .ok_or_else(|| {
                CredentialsError::Other("Failed to determine home directory".to_string())
            })
    }

    /// Create a provider for an explicit credentials file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            store: CredentialsStore::with_path(path),
        }
    }

    /// Get the path to the credentials file.
    pub fn credentials_path(&self) -> &Path {
        self.store.credentials_path()
    }
}

#[async_trait]
impl CredentialProvider for FileCredentialProvider {
    async fn get_token(&self) -> Result<Option<AuthToken>, CredentialsError> {
        let store = self.store.clone();
        let stored = tokio::task::spawn_blocking(move || store.load())
            .await
            .map_err(|e| CredentialsError::LoadFailed(e.to_string()))??;

        let token = stored.into_token();
        if token.is_none() {
            tracing::debug!(
                "No token stored in {}",
                self.store.credentials_path().display()
            );
        }
        Ok(token)
    }
}
