//! Common test utilities for integration tests.
//!
//! Builds a [`ChatService`] wired to a real reqwest client pointed at a
//! wiremock server, with credentials loaded from a temp file.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chairside::adapters::mock::RecordingNotifier;
use chairside::adapters::{FileCredentialProvider, ReqwestHttpClient};
use chairside::chat::ChatService;
use chairside::config::ClientConfig;
use tempfile::TempDir;
use wiremock::MockServer;

/// A service under test plus the handles needed to inspect it.
pub struct TestClient {
    pub service: ChatService,
    pub notifier: RecordingNotifier,
    /// Keeps the credentials directory alive for the test.
    pub temp_dir: TempDir,
}

/// Write a credentials file in the stored JSON format.
pub fn write_credentials(dir: &Path, token: &str) {
    let json = serde_json::json!({ "authToken": token, "tokenType": "Bearer" });
    std::fs::write(dir.join("credentials.json"), json.to_string()).unwrap();
}

/// Service pointed at `server` with no stored token.
pub fn signed_out_client(server: &MockServer) -> TestClient {
    build_client(server, None)
}

/// Service pointed at `server` with `token` stored.
pub fn signed_in_client(server: &MockServer, token: &str) -> TestClient {
    build_client(server, Some(token))
}

fn build_client(server: &MockServer, token: Option<&str>) -> TestClient {
    let temp_dir = TempDir::new().unwrap();
    if let Some(token) = token {
        write_credentials(temp_dir.path(), token);
    }

    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_idle_timeout(Duration::from_secs(5))
        .with_total_timeout(Duration::from_secs(10));
    let http = ReqwestHttpClient::from_config(&config).unwrap();
    let credentials = FileCredentialProvider::with_path(temp_dir.path().join("credentials.json"));
    let notifier = RecordingNotifier::new();

    let service = ChatService::new(
        Arc::new(http),
        Arc::new(credentials),
        Arc::new(notifier.clone()),
        config,
    );

    TestClient {
        service,
        notifier,
        temp_dir,
    }
}

/// An SSE body made of `data:` events for each token, ending with `[DONE]`.
pub fn sse_body(tokens: &[&str]) -> String {
    let mut body: String = tokens
        .iter()
        .map(|token| format!("data: {}\n\n", token))
        .collect();
    body.push_str("data: [DONE]\n\n");
    body
}
