//! Mock implementations for testing.
//!
//! This module provides mock implementations of the trait abstractions,
//! enabling unit testing without network dependencies or file system access.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable streaming responses
//! - [`InMemoryCredentials`] - In-memory token storage
//! - [`RecordingNotifier`] - Notification sink that records everything

pub mod credentials;
pub mod http;
pub mod notifier;

pub use credentials::InMemoryCredentials;
pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use notifier::RecordingNotifier;
