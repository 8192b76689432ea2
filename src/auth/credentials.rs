//! Stored credentials for the chat client.
//!
//! The web client keeps its session under two storage keys, `authToken` and
//! `tokenType`. The command-line client mirrors them in
//! `~/.chairside/credentials.json`:
//!
//! ```json
//! { "authToken": "eyJhbGciOi...", "tokenType": "Bearer" }
//! ```
//!
//! This module only reads the file; issuing and refreshing tokens belongs to
//! the platform's sign-in flow.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// The credentials directory name.
const CREDENTIALS_DIR: &str = ".chairside";

/// The credentials file name.
const CREDENTIALS_FILE: &str = "credentials.json";

/// Token type used when the stored one is missing or blank.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Raw contents of the credentials file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCredentials {
    #[serde(rename = "authToken", default)]
    pub auth_token: Option<String>,
    #[serde(rename = "tokenType", default)]
    pub token_type: Option<String>,
}

impl StoredCredentials {
    /// Turn the stored keys into a usable token.
    ///
    /// Returns `None` when no non-blank token is stored.
    pub fn into_token(self) -> Option<AuthToken> {
        let access_token = self.auth_token?.trim().to_string();
        if access_token.is_empty() {
            return None;
        }
        let token_type = self
            .token_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string());
        Some(AuthToken {
            access_token,
            token_type,
        })
    }
}

/// Access token plus its scheme.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
}

impl AuthToken {
    /// Create a bearer token.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: DEFAULT_TOKEN_TYPE.to_string(),
        }
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Reads credentials from disk.
#[derive(Debug, Clone)]
pub struct CredentialsStore {
    /// Path to the credentials file.
    credentials_path: PathBuf,
}

impl CredentialsStore {
    /// Create a store for `~/.chairside/credentials.json`.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        Some(Self::with_path(
            home.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE),
        ))
    }

    /// Create a store for an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: path.into(),
        }
    }

    /// Get the path to the credentials file.
    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    /// Load the stored credentials.
    ///
    /// A missing file is not an error and yields empty credentials. A file
    /// that exists but cannot be read or parsed is.
    pub fn load(&self) -> io::Result<StoredCredentials> {
        let file = match File::open(&self.credentials_path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(StoredCredentials::default())
            }
            Err(e) => return Err(e),
        };

        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join(CREDENTIALS_FILE);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_stored_credentials_uses_storage_key_names() {
        let creds: StoredCredentials =
            serde_json::from_str(r#"{"authToken":"abc","tokenType":"Bearer"}"#).unwrap();
        assert_eq!(creds.auth_token.as_deref(), Some("abc"));
        assert_eq!(creds.token_type.as_deref(), Some("Bearer"));
    }

    #[test]
    fn test_into_token_defaults_token_type() {
        let creds = StoredCredentials {
            auth_token: Some("abc".to_string()),
            token_type: None,
        };
        assert_eq!(creds.into_token(), Some(AuthToken::bearer("abc")));
    }

    #[test]
    fn test_into_token_keeps_custom_type() {
        let creds = StoredCredentials {
            auth_token: Some("abc".to_string()),
            token_type: Some("JWT".to_string()),
        };
        let token = creds.into_token().unwrap();
        assert_eq!(token.authorization_header(), "JWT abc");
    }

    #[test]
    fn test_blank_token_is_none() {
        let creds = StoredCredentials {
            auth_token: Some("   ".to_string()),
            token_type: Some("Bearer".to_string()),
        };
        assert_eq!(creds.into_token(), None);
        assert_eq!(StoredCredentials::default().into_token(), None);
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", AuthToken::bearer("secret-value"));
        assert!(!debug.contains("secret-value"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = CredentialsStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load().unwrap(), StoredCredentials::default());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, r#"{"authToken":"tok","tokenType":"Bearer"}"#);
        let store = CredentialsStore::with_path(path);
        let token = store.load().unwrap().into_token().unwrap();
        assert_eq!(token.authorization_header(), "Bearer tok");
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "not json");
        let store = CredentialsStore::with_path(path);
        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_default_path_under_home() {
        if let Some(store) = CredentialsStore::new() {
            let path = store.credentials_path().to_string_lossy().into_owned();
            assert!(path.ends_with(".chairside/credentials.json") || path.ends_with(".chairside\\credentials.json"));
        }
    }
}
