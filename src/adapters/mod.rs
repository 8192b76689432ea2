//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`FileCredentialProvider`] - token read from `~/.chairside/credentials.json`
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Configurable streaming responses
//! - [`mock::InMemoryCredentials`] - In-memory token storage
//! - [`mock::RecordingNotifier`] - Captures notifications

pub mod file_credentials;
pub mod mock;
pub mod reqwest_http;

pub use file_credentials::FileCredentialProvider;
pub use mock::{InMemoryCredentials, MockHttpClient, MockResponse, RecordingNotifier};
pub use reqwest_http::ReqwestHttpClient;
