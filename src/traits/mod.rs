//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - streaming POST requests
//! - [`CredentialProvider`] - read access to the stored token
//! - [`Notifier`] - app-wide notification channel
//! - [`SseParserTrait`] - line-level Server-Sent Events parsing

pub mod credentials;
pub mod http;
pub mod notifier;
pub mod sse;

pub use credentials::{CredentialProvider, CredentialsError};
pub use http::{ByteStream, Headers, HttpClient, HttpError, StreamingResponse};
pub use notifier::Notifier;
pub use sse::SseParserTrait;
