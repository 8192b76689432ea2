//! HTTP client trait abstraction.
//!
//! Provides a trait-based abstraction for the one HTTP operation the chat
//! client needs, a POST whose body is read incrementally, enabling
//! dependency injection and mocking in tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// Response body delivered chunk by chunk.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// Response whose body has not been read yet.
pub struct StreamingResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body, `None` when the transport exposed no readable body
    pub body: Option<ByteStream>,
}

impl StreamingResponse {
    /// Create a response with a body stream.
    pub fn new(status: u16, headers: Headers, body: ByteStream) -> Self {
        Self {
            status,
            headers,
            body: Some(body),
        }
    }

    /// Create a response that has no readable body.
    pub fn without_body(status: u16, headers: Headers) -> Self {
        Self {
            status,
            headers,
            body: None,
        }
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Drain the body into a string (lossy UTF-8).
    pub async fn text(self) -> Result<String, HttpError> {
        self.text_limited(usize::MAX).await
    }

    /// Read at most `max_bytes` of the body into a string (lossy UTF-8).
    ///
    /// Used for error responses, where only a short message is expected.
    /// Reading stops once the cap is reached; the rest of the body is dropped.
    pub async fn text_limited(self, max_bytes: usize) -> Result<String, HttpError> {
        let Some(mut body) = self.body else {
            return Ok(String::new());
        };
        let mut bytes = Vec::new();
        while bytes.len() < max_bytes {
            let Some(chunk) = body.next().await else {
                break;
            };
            let chunk = chunk?;
            let room = max_bytes - bytes.len();
            bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// HTTP client errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// Connection failed
    ConnectionFailed { url: String, message: String },
    /// Request timeout
    Timeout(String),
    /// Request was cancelled
    Cancelled,
    /// IO error while reading the body
    Io(String),
    /// Invalid URL
    InvalidUrl(String),
    /// Other error
    Other(String),
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to {}: {}", url, message)
            }
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::Cancelled => write!(f, "Request cancelled"),
            HttpError::Io(msg) => write!(f, "IO error: {}", msg),
            HttpError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Trait for HTTP client operations.
///
/// Implementations include the production reqwest-based client and a mock
/// client for testing. A non-2xx status is not an error at this layer: the
/// caller inspects [`StreamingResponse::status`] and reads the body itself.
///
/// # Example
///
/// ```ignore
/// use chairside::traits::{HttpClient, Headers, HttpError};
///
/// async fn ask<C: HttpClient>(client: &C) -> Result<String, HttpError> {
///     let response = client
///         .post_stream("https://api.example.com/genai/chatbot/help", "Hi", &Headers::new())
///         .await?;
///     response.text().await
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a POST request and return the response with an unread body.
    ///
    /// # Arguments
    /// * `url` - The URL to request
    /// * `body` - Request body as a string
    /// * `headers` - Request headers
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<StreamingResponse, HttpError>;
}
