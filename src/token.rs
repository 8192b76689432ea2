//! Token extraction from SSE data payloads.
//!
//! The chatbot backend sends one of three payload shapes per event:
//! - a completion sentinel (`[DONE]` or the literal `null`)
//! - an OpenAI-compatible chunk:
//!   `{"choices":[{"delta":{"content":"..."},"finish_reason":null}]}`
//! - anything else, which is plain token text
//!
//! [`classify_payload`] sniffs the shape once; [`extract_streaming_token`]
//! turns the classification into a [`StreamingToken`].

use serde::Deserialize;

/// Payloads that mark the end of a stream.
const COMPLETION_SENTINELS: [&str; 2] = ["[DONE]", "null"];

/// Finish reason reported for sentinel-terminated streams.
pub const SENTINEL_FINISH_REASON: &str = "stop";

/// One incremental piece of the assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingToken {
    /// Token text, possibly empty
    pub content: String,
    /// Whether this token ends the stream
    pub is_complete: bool,
    /// Backend-reported reason for finishing
    pub finish_reason: Option<String>,
}

impl StreamingToken {
    /// A plain text token that does not end the stream.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_complete: false,
            finish_reason: None,
        }
    }

    /// The token produced by a completion sentinel.
    pub fn completion() -> Self {
        Self {
            content: String::new(),
            is_complete: true,
            finish_reason: Some(SENTINEL_FINISH_REASON.to_string()),
        }
    }
}

/// Classified shape of one data payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamPayload {
    /// Plain text token
    RawText(String),
    /// `[DONE]` / `null`
    CompletionSentinel,
    /// OpenAI-compatible delta chunk
    StructuredDelta {
        content: String,
        finish_reason: Option<String>,
    },
}

impl From<StreamPayload> for StreamingToken {
    fn from(payload: StreamPayload) -> Self {
        match payload {
            StreamPayload::RawText(text) => StreamingToken::text(text),
            StreamPayload::CompletionSentinel => StreamingToken::completion(),
            StreamPayload::StructuredDelta {
                content,
                finish_reason,
            } => StreamingToken {
                content,
                is_complete: finish_reason.is_some(),
                finish_reason,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChunkPayload {
    choices: Vec<ChoicePayload>,
}

#[derive(Debug, Deserialize)]
struct ChoicePayload {
    delta: Option<DeltaPayload>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DeltaPayload {
    #[serde(default)]
    content: Option<String>,
}

/// Classify a data payload.
///
/// Returns `None` for empty or whitespace-only payloads. JSON that does not
/// match the chunk shape, and malformed JSON, are raw text.
pub fn classify_payload(data: &str) -> Option<StreamPayload> {
    if data.trim().is_empty() {
        return None;
    }

    if COMPLETION_SENTINELS.contains(&data.trim()) {
        return Some(StreamPayload::CompletionSentinel);
    }

    if let Some((content, finish_reason)) = parse_delta_chunk(data) {
        return Some(StreamPayload::StructuredDelta {
            content,
            finish_reason,
        });
    }

    Some(StreamPayload::RawText(data.to_string()))
}

/// Extract the streaming token carried by a data payload.
pub fn extract_streaming_token(data: &str) -> Option<StreamingToken> {
    classify_payload(data).map(StreamingToken::from)
}

/// Pull `(content, finish_reason)` out of an OpenAI-style chunk.
fn parse_delta_chunk(data: &str) -> Option<(String, Option<String>)> {
    let trimmed = data.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }

    let chunk: ChunkPayload = match serde_json::from_str(trimmed) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::debug!("Payload is not a delta chunk, treating as text: {}", e);
            return None;
        }
    };

    let choice = chunk.choices.into_iter().next()?;
    let delta = choice.delta?;
    Some((delta.content.unwrap_or_default(), choice.finish_reason))
}
