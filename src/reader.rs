//! Read loop over one streaming chat response.
//!
//! [`SseReader`] checks the response preconditions, then repeatedly:
//! reads a body chunk, decodes it as UTF-8, splits complete event blocks off
//! the buffer, turns each event into a token, folds the token into the
//! running text, and hands `(token, full_text)` to the caller. It stops when
//! a token completes the reply or the body ends.
//!
//! The loop races every read against the cancellation token and the total
//! deadline, and bounds each read by the idle timeout.

use std::future;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::StreamError;
use crate::spacing::TokenAccumulator;
use crate::sse::{parse_sse_events_with, process_sse_buffer_with, SseEvent, SseParser};
use crate::token::extract_streaming_token;
use crate::traits::{ByteStream, HttpError, SseParserTrait, StreamingResponse};

/// Media type every chat response must declare.
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Check that `content_type` names an event stream, ignoring case and parameters.
pub fn is_event_stream(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|media| media.trim().eq_ignore_ascii_case(EVENT_STREAM_CONTENT_TYPE))
        .unwrap_or(false)
}

/// Check the response preconditions without consuming the body.
pub fn validate_response(response: &StreamingResponse) -> Result<(), StreamError> {
    let content_type = response.header("content-type");
    if !content_type.map(is_event_stream).unwrap_or(false) {
        return Err(StreamError::InvalidContentType {
            content_type: content_type.map(str::to_string),
        });
    }
    if response.body.is_none() {
        return Err(StreamError::MissingBody);
    }
    Ok(())
}

/// Drives the decode loop for one response.
///
/// A reader is cheap to build and holds no per-stream state, so one reader
/// may serve several sequential reads. Each `read` owns its own buffer,
/// decoder, and accumulator.
#[derive(Debug, Clone, Default)]
pub struct SseReader {
    idle_timeout: Option<Duration>,
    total_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl SseReader {
    /// Reader without timeouts and with its own cancellation token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reader using the timeouts from `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            idle_timeout: config.idle_timeout,
            total_timeout: config.total_timeout,
            cancel: CancellationToken::new(),
        }
    }

    /// Builder method to set the max silence between chunks.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Builder method to set the max stream duration.
    pub fn with_total_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.total_timeout = timeout;
        self
    }

    /// Builder method to observe an external cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The token that aborts this reader's reads.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Read the whole response, calling `on_token(token, full_text)` in order.
    ///
    /// Resolves with the accumulated text. No callback runs once the
    /// cancellation token has fired.
    pub async fn read<F>(&self, response: StreamingResponse, on_token: F) -> Result<String, StreamError>
    where
        F: FnMut(&str, &str),
    {
        self.read_with_parser(response, SseParser::new(), on_token).await
    }

    /// [`read`](Self::read) with the event lines parsed by `parser`.
    pub async fn read_with_parser<P, F>(
        &self,
        response: StreamingResponse,
        mut parser: P,
        mut on_token: F,
    ) -> Result<String, StreamError>
    where
        P: SseParserTrait,
        F: FnMut(&str, &str),
    {
        validate_response(&response)?;
        let mut body = response.body.ok_or(StreamError::MissingBody)?;

        let deadline = self.total_timeout.map(|limit| Instant::now() + limit);
        let mut decoder = Utf8ChunkDecoder::default();
        let mut accumulator = TokenAccumulator::new();
        let mut buffer = String::new();

        tracing::debug!(
            "Reading event stream (idle timeout {:?}, total timeout {:?})",
            self.idle_timeout,
            self.total_timeout
        );

        loop {
            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Stream aborted by caller");
                    return Err(StreamError::Aborted);
                }
                _ = wait_until(deadline) => {
                    let duration_secs = self.total_timeout.map(|t| t.as_secs()).unwrap_or_default();
                    tracing::warn!("Stream exceeded total timeout of {}s", duration_secs);
                    return Err(StreamError::TotalTimeout { duration_secs });
                }
                read = next_chunk(&mut body, self.idle_timeout) => read,
            };

            let chunk = match read {
                ChunkRead::Chunk(chunk) => chunk,
                ChunkRead::End => break,
                ChunkRead::IdleTimeout => {
                    let duration_secs = self.idle_timeout.map(|t| t.as_secs()).unwrap_or_default();
                    tracing::warn!("No stream data for {}s", duration_secs);
                    return Err(StreamError::IdleTimeout { duration_secs });
                }
                ChunkRead::Failed(HttpError::Cancelled) => return Err(StreamError::Aborted),
                ChunkRead::Failed(e) => {
                    tracing::warn!("Stream body failed: {}", e);
                    return Err(StreamError::from(e));
                }
            };

            buffer.push_str(&decoder.decode(&chunk));
            let parsed = process_sse_buffer_with(&mut parser, &buffer);
            buffer = parsed.remaining_buffer;

            if self.dispatch(parsed.events, &mut accumulator, &mut on_token)? {
                tracing::debug!(
                    "Stream completed after {} tokens",
                    accumulator.tokens_seen()
                );
                return Ok(accumulator.into_text());
            }
        }

        buffer.push_str(&decoder.finish());
        if !buffer.trim().is_empty() {
            tracing::debug!("Flushing unterminated final block ({} bytes)", buffer.len());
            buffer.push_str("\n\n");
            let events = parse_sse_events_with(&mut parser, &buffer);
            self.dispatch(events, &mut accumulator, &mut on_token)?;
        }

        tracing::debug!(
            "Stream ended after {} tokens without a completion signal",
            accumulator.tokens_seen()
        );
        Ok(accumulator.into_text())
    }

    /// Read the whole response without a callback.
    pub async fn read_to_string(&self, response: StreamingResponse) -> Result<String, StreamError> {
        self.read(response, |_, _| {}).await
    }

    /// Fold events into the accumulator. Returns `true` once a token completes the reply.
    fn dispatch<F>(
        &self,
        events: Vec<SseEvent>,
        accumulator: &mut TokenAccumulator,
        on_token: &mut F,
    ) -> Result<bool, StreamError>
    where
        F: FnMut(&str, &str),
    {
        for event in events {
            if self.cancel.is_cancelled() {
                return Err(StreamError::Aborted);
            }

            if event.is_error() {
                tracing::warn!("Backend sent an error event: {}", event.data);
                continue;
            }

            let Some(token) = extract_streaming_token(&event.data) else {
                continue;
            };

            accumulator.push(&token, &mut *on_token);

            if token.is_complete {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

enum ChunkRead {
    Chunk(Bytes),
    End,
    IdleTimeout,
    Failed(HttpError),
}

async fn next_chunk(body: &mut ByteStream, idle_timeout: Option<Duration>) -> ChunkRead {
    let next = match idle_timeout {
        Some(limit) => match tokio::time::timeout(limit, body.next()).await {
            Ok(next) => next,
            Err(_) => return ChunkRead::IdleTimeout,
        },
        None => body.next().await,
    };

    match next {
        Some(Ok(chunk)) => ChunkRead::Chunk(chunk),
        Some(Err(e)) => ChunkRead::Failed(e),
        None => ChunkRead::End,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

/// UTF-8 decoder that carries a split multi-byte sequence to the next chunk.
///
/// Invalid sequences become U+FFFD instead of failing the stream.
#[derive(Debug, Default)]
struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::with_capacity(self.pending.len());

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Flush whatever is left at end of stream.
    fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}
