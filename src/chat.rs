//! Chat routing.
//!
//! [`ChatService`] turns a chat type and a user message into a streaming
//! POST against the right backend endpoint, feeds the response through the
//! [`SseReader`], and decides how a failure reaches the user:
//!
//! - signed out on a gated assistant: the auth message is delivered as if it
//!   were the reply, and no request is sent
//! - rate limited: the backend's own wording is delivered as the reply
//! - anything else: a connection-error notification plus an apology as the reply
//! - cancelled: nothing at all

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{AuthError, ChatError, ChatResult, NetworkError, StreamError};
use crate::notifications::Notification;
use crate::reader::{SseReader, EVENT_STREAM_CONTENT_TYPE};
use crate::session::ChatSession;
use crate::traits::{CredentialProvider, Headers, HttpClient, Notifier, StreamingResponse};

/// Header carrying the conversation id for context-bearing assistants.
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Snackbar text for transport and server failures.
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Connection error. Please check your network and try again.";

/// Most of an error response body that is read before classifying it.
pub const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

/// Reply text shown in the transcript when a request fails.
pub const APOLOGY_MESSAGE: &str =
    "Sorry, I couldn't process your request right now. Please try again in a moment.";

/// Which assistant handles a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChatType {
    /// Public help desk, no sign-in needed
    Help,
    /// Clinical assistant for dentists
    Aidentist,
    /// Front-desk assistant
    Receptionist,
    /// Symptom triage
    Triage,
    /// Summarizes clinical documentation
    DocumentationSummarize,
}

impl ChatType {
    pub const ALL: [ChatType; 5] = [
        ChatType::Help,
        ChatType::Aidentist,
        ChatType::Receptionist,
        ChatType::Triage,
        ChatType::DocumentationSummarize,
    ];

    /// Endpoint path, relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            ChatType::Help => "/genai/chatbot/help",
            ChatType::Aidentist => "/genai/chatbot/aidentist",
            ChatType::Receptionist => "/genai/chatbot/receptionist",
            ChatType::Triage => "/genai/chatbot/triage",
            ChatType::DocumentationSummarize => "/genai/chatbot/documentation/summarize",
        }
    }

    /// Whether the endpoint needs a bearer token.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, ChatType::Help)
    }

    /// Whether the endpoint keeps conversation context keyed by session id.
    pub fn uses_session(&self) -> bool {
        matches!(self, ChatType::Aidentist)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::Help => "help",
            ChatType::Aidentist => "aidentist",
            ChatType::Receptionist => "receptionist",
            ChatType::Triage => "triage",
            ChatType::DocumentationSummarize => "documentation-summarize",
        }
    }
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized chat type name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown chat type '{0}' (expected one of: help, aidentist, receptionist, triage, documentation-summarize)")]
pub struct UnknownChatType(pub String);

impl FromStr for ChatType {
    type Err = UnknownChatType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "help" => Ok(ChatType::Help),
            "aidentist" => Ok(ChatType::Aidentist),
            "receptionist" => Ok(ChatType::Receptionist),
            "triage" => Ok(ChatType::Triage),
            "documentationsummarize" | "summarize" => Ok(ChatType::DocumentationSummarize),
            _ => Err(UnknownChatType(s.to_string())),
        }
    }
}

/// One message to send.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub chat_type: ChatType,
    pub message: String,
    pub session_id: Option<Uuid>,
    pub cancel: CancellationToken,
}

impl ChatRequest {
    pub fn new(chat_type: ChatType, message: impl Into<String>) -> Self {
        Self {
            chat_type,
            message: message.into(),
            session_id: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Builder method to attach a conversation id.
    pub fn with_session(mut self, session_id: Uuid) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Builder method to abort the request through `cancel`.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Routes chat messages to the backend and streams the replies.
///
/// Cheap to clone; every request gets its own reader state, so one service
/// may run any number of requests concurrently.
#[derive(Clone)]
pub struct ChatService {
    http: Arc<dyn HttpClient>,
    credentials: Arc<dyn CredentialProvider>,
    notifier: Arc<dyn Notifier>,
    config: ClientConfig,
}

impl ChatService {
    pub fn new(
        http: Arc<dyn HttpClient>,
        credentials: Arc<dyn CredentialProvider>,
        notifier: Arc<dyn Notifier>,
        config: ClientConfig,
    ) -> Self {
        Self {
            http,
            credentials,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one message and stream the reply.
    ///
    /// `on_token(token, full_text)` runs for each token in order. On failure
    /// it may run once more with the text to show in place of the reply (see
    /// the module docs); the error is returned either way.
    pub async fn send<F>(&self, request: ChatRequest, mut on_token: F) -> ChatResult<String>
    where
        F: FnMut(&str, &str),
    {
        match self.stream_reply(&request, &mut on_token).await {
            Ok(text) => {
                tracing::info!(
                    "{} reply complete ({} chars)",
                    request.chat_type,
                    text.len()
                );
                Ok(text)
            }
            Err(err) => {
                self.surface_error(&request, &err, &mut on_token);
                Err(err)
            }
        }
    }

    /// Send a message within `session`, recording both sides in its transcript.
    pub async fn send_in_session<F>(
        &self,
        session: &mut ChatSession,
        message: impl Into<String>,
        cancel: CancellationToken,
        mut on_token: F,
    ) -> ChatResult<String>
    where
        F: FnMut(&str, &str),
    {
        let message = message.into();
        session.add_user_message(message.clone());
        let reply_id = session.begin_assistant_message();

        let request = ChatRequest::new(session.chat_type(), message)
            .with_session(session.id())
            .with_cancellation(cancel);

        let result = self
            .send(request, |token, full| {
                session.update_streaming(reply_id, full);
                on_token(token, full);
            })
            .await;

        match &result {
            Ok(text) => {
                session.finish_streaming(reply_id, text);
            }
            Err(err) => match transcript_message(err) {
                Some(text) => {
                    session.fail_streaming(reply_id, &text);
                }
                None => {
                    session.discard_streaming(reply_id);
                }
            },
        }
        result
    }

    async fn stream_reply<F>(&self, request: &ChatRequest, on_token: &mut F) -> ChatResult<String>
    where
        F: FnMut(&str, &str),
    {
        let headers = self.build_headers(request).await?;
        let url = self.config.endpoint_url(request.chat_type.path());

        tracing::info!(
            "Sending {} chat message ({} chars)",
            request.chat_type,
            request.message.len()
        );

        let response = tokio::select! {
            biased;
            _ = request.cancel.cancelled() => return Err(StreamError::Aborted.into()),
            response = self.http.post_stream(&url, &request.message, &headers) => response?,
        };

        if !response.is_success() {
            let status = response.status;
            let retry_after = response
                .header("retry-after")
                .and_then(|v| v.trim().parse::<u64>().ok());
            tracing::warn!("{} returned HTTP {}", url, status);
            let body = self.read_error_body(response, &request.cancel).await?;

            let mut err = ChatError::from_status(status, extract_error_message(&body));
            if let ChatError::Network(NetworkError::RateLimited {
                retry_after_secs, ..
            }) = &mut err
            {
                *retry_after_secs = retry_after;
            }
            return Err(err);
        }

        let reader = SseReader::from_config(&self.config).with_cancellation(request.cancel.clone());
        Ok(reader.read(response, &mut *on_token).await?)
    }

    /// Text of a non-2xx response, for classifying the failure.
    ///
    /// The read is capped at [`MAX_ERROR_BODY_BYTES`], bounded by the idle
    /// timeout (or the total timeout when there is none), and abandoned as
    /// soon as the request is cancelled. A body that fails or stalls reads as
    /// empty, leaving the status to decide the error.
    async fn read_error_body(
        &self,
        response: StreamingResponse,
        cancel: &CancellationToken,
    ) -> ChatResult<String> {
        let limit = self.config.idle_timeout.or(self.config.total_timeout);
        let read = async {
            let text = response.text_limited(MAX_ERROR_BODY_BYTES);
            match limit {
                Some(limit) => tokio::time::timeout(limit, text).await.unwrap_or_else(|_| {
                    tracing::warn!("Error body not received within {:?}", limit);
                    Ok(String::new())
                }),
                None => text.await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StreamError::Aborted.into()),
            body = read => Ok(body.unwrap_or_else(|e| {
                tracing::debug!("Could not read error body: {}", e);
                String::new()
            })),
        }
    }

    /// Request headers, applying the authentication gate.
    async fn build_headers(&self, request: &ChatRequest) -> ChatResult<Headers> {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        headers.insert("Accept".to_string(), EVENT_STREAM_CONTENT_TYPE.to_string());

        if request.chat_type.requires_auth() {
            let token = self
                .credentials
                .get_token()
                .await
                .map_err(AuthError::from)?
                .ok_or(AuthError::NotAuthenticated)?;
            headers.insert("Authorization".to_string(), token.authorization_header());
        }

        if request.chat_type.uses_session() {
            match request.session_id {
                Some(id) => {
                    headers.insert(SESSION_HEADER.to_string(), id.to_string());
                }
                None => tracing::debug!(
                    "{} request sent without a session id",
                    request.chat_type
                ),
            }
        }

        Ok(headers)
    }

    fn surface_error<F>(&self, request: &ChatRequest, err: &ChatError, on_token: &mut F)
    where
        F: FnMut(&str, &str),
    {
        if err.is_aborted() {
            tracing::debug!("{} request cancelled", request.chat_type);
            return;
        }

        tracing::warn!(
            "{} request failed [{}] ({}): {}",
            request.chat_type,
            err.error_code(),
            err.category(),
            err
        );

        let Some(text) = transcript_message(err) else {
            return;
        };

        if err.is_rate_limited() || matches!(err, ChatError::Auth(_)) {
            self.notifier.notify(Notification::warning(text.clone()));
        } else {
            self.notifier
                .notify(Notification::error(CONNECTION_ERROR_MESSAGE));
        }
        on_token(&text, &text);
    }
}

/// Text shown in the transcript in place of the reply, `None` when silent.
pub fn transcript_message(err: &ChatError) -> Option<String> {
    if err.is_aborted() {
        return None;
    }
    if let Some(message) = err.rate_limit_message() {
        return Some(message);
    }
    match err {
        ChatError::Auth(auth) => Some(auth.user_message()),
        _ => Some(APOLOGY_MESSAGE.to_string()),
    }
}

/// Pull a human-readable message out of an error body.
///
/// JSON bodies of the form `{"message": ...}`, `{"error": ...}` or
/// `{"detail": ...}` yield that field; anything else is used as-is.
fn extract_error_message(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["message", "error", "detail"] {
            if let Some(serde_json::Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    trimmed.to_string()
}
