//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that returns predefined
//! streaming responses or errors and records every request it receives.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, StreamingResponse};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: String,
}

impl RecordedRequest {
    /// Look up a request header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Respond with a body made of `chunks`, optionally pausing before each
    Stream {
        status: u16,
        headers: Headers,
        chunks: Vec<Result<Bytes, HttpError>>,
        chunk_delay: Option<Duration>,
    },
    /// Respond without a readable body
    NoBody { status: u16, headers: Headers },
    /// Fail before any response arrives
    Error(HttpError),
}

impl MockResponse {
    /// A 200 `text/event-stream` response delivering `chunks` in order.
    pub fn sse<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Stream {
            status: 200,
            headers: content_type("text/event-stream"),
            chunks: chunks
                .into_iter()
                .map(|chunk| Ok(Bytes::from(chunk.into())))
                .collect(),
            chunk_delay: None,
        }
    }

    /// A plain-text response with the given status and body.
    pub fn status(status: u16, body: &str) -> Self {
        Self::Stream {
            status,
            headers: content_type("text/plain"),
            chunks: vec![Ok(Bytes::from(body.to_string()))],
            chunk_delay: None,
        }
    }

    /// Replace the `content-type` header.
    pub fn with_content_type(self, value: &str) -> Self {
        self.with_header("content-type", value)
    }

    /// Set a response header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match &mut self {
            Self::Stream { headers, .. } | Self::NoBody { headers, .. } => {
                headers.insert(name.to_string(), value.to_string());
            }
            Self::Error(_) => {}
        }
        self
    }

    /// Pause before delivering each chunk.
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        if let Self::Stream { chunk_delay, .. } = &mut self {
            *chunk_delay = Some(delay);
        }
        self
    }

    /// Fail the body with `err` after the configured chunks.
    pub fn then_error(mut self, err: HttpError) -> Self {
        if let Self::Stream { chunks, .. } = &mut self {
            chunks.push(Err(err));
        }
        self
    }

    fn into_response(self) -> Result<StreamingResponse, HttpError> {
        match self {
            Self::Stream {
                status,
                headers,
                chunks,
                chunk_delay,
            } => {
                let body: ByteStream = match chunk_delay {
                    Some(delay) => Box::pin(futures::stream::iter(chunks).then(move |chunk| async move {
                        tokio::time::sleep(delay).await;
                        chunk
                    })),
                    None => Box::pin(futures::stream::iter(chunks)),
                };
                Ok(StreamingResponse::new(status, headers, body))
            }
            Self::NoBody { status, headers } => Ok(StreamingResponse::without_body(status, headers)),
            Self::Error(err) => Err(err),
        }
    }
}

fn content_type(value: &str) -> Headers {
    let mut headers = Headers::new();
    headers.insert("content-type".to_string(), value.to_string());
    headers
}

/// Mock HTTP client for testing.
///
/// # Example
///
/// ```ignore
/// use chairside::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "http://localhost:8080/genai/chatbot/help",
///     MockResponse::sse(["data: Hello\n\n", "data: [DONE]\n\n"]),
/// );
///
/// // ... run the code under test ...
///
/// let requests = client.get_requests();
/// assert_eq!(requests.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// Configured responses by URL
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a response for a specific URL.
    ///
    /// The URL is matched exactly first, then as a prefix.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    /// Record a request.
    fn record_request(&self, url: &str, headers: &Headers, body: &str) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
            body: body.to_string(),
        });
    }

    /// Get the response for a URL.
    fn get_response(&self, url: &str) -> Option<MockResponse> {
        let responses = self.responses.lock().unwrap();

        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        for (pattern, response) in responses.iter() {
            if url.starts_with(pattern) {
                return Some(response.clone());
            }
        }

        let default = self.default_response.lock().unwrap();
        default.clone()
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<StreamingResponse, HttpError> {
        self.record_request(url, headers, body);

        match self.get_response(url) {
            Some(response) => response.into_response(),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(response: StreamingResponse) -> Vec<Result<Bytes, HttpError>> {
        match response.body {
            Some(body) => body.collect().await,
            None => Vec::new(),
        }
    }

    #[test]
    fn test_mock_http_client_new() {
        let client = MockHttpClient::default();
        assert!(client.get_requests().is_empty());
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn test_post_stream_with_chunks() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/stream",
            MockResponse::sse(["chunk1", "chunk2", "chunk3"]),
        );

        let response = client
            .post_stream("https://example.com/stream", "Hi", &Headers::new())
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.header("Content-Type"), Some("text/event-stream"));

        let chunks: Vec<Bytes> = collect(response)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(
            chunks,
            vec![
                Bytes::from("chunk1"),
                Bytes::from("chunk2"),
                Bytes::from("chunk3")
            ]
        );
    }

    #[tokio::test]
    async fn test_status_response() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::status(429, "Too many requests"));

        let response = client
            .post_stream("https://example.com/anything", "Hi", &Headers::new())
            .await
            .unwrap();
        assert_eq!(response.status, 429);
        assert_eq!(response.text().await.unwrap(), "Too many requests");
    }

    #[tokio::test]
    async fn test_error_response() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Error(HttpError::Timeout("5s".to_string())));

        let result = client
            .post_stream("https://example.com/slow", "Hi", &Headers::new())
            .await;
        assert!(matches!(result, Err(HttpError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_then_error_appends_body_failure() {
        let client = MockHttpClient::new();
        client.set_default_response(
            MockResponse::sse(["data: a\n\n"]).then_error(HttpError::Io("reset".to_string())),
        );

        let response = client
            .post_stream("https://example.com/", "Hi", &Headers::new())
            .await
            .unwrap();
        let items = collect(response).await;
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn test_no_body_response() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::NoBody {
            status: 200,
            headers: Headers::new(),
        });
        let response = client
            .post_stream("https://example.com/", "Hi", &Headers::new())
            .await
            .unwrap();
        assert!(response.body.is_none());
    }

    #[tokio::test]
    async fn test_no_response_configured() {
        let client = MockHttpClient::new();
        let result = client
            .post_stream("https://example.com/missing", "Hi", &Headers::new())
            .await;
        assert!(matches!(result, Err(HttpError::Other(_))));
    }

    #[tokio::test]
    async fn test_requests_recorded() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::sse(["data: [DONE]\n\n"]));

        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), "Bearer token123".to_string());
        client
            .post_stream("https://example.com/auth", "Hello", &headers)
            .await
            .unwrap();

        let requests = client.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://example.com/auth");
        assert_eq!(requests[0].body, "Hello");
        assert_eq!(requests[0].header("authorization"), Some("Bearer token123"));

        client.clear_requests();
        assert!(client.get_requests().is_empty());
    }
}
