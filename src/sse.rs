//! SSE (Server-Sent Events) parsing for the chatbot streaming API.
//!
//! The backend streams blocks separated by a blank line. Each block is a
//! set of `field: value` lines:
//! - `event: <type>` - event type (defaults to `message`)
//! - `data: <payload>` - data payload, may repeat
//! - `id: <id>` - last event id
//! - `retry: <ms>` - reconnection hint, integer only
//! - Lines starting with `:` - comments (ignored)
//!
//! Two layers live here: [`SseParser`] turns lines into [`SseEvent`]s, and
//! [`process_sse_buffer`] splits raw network text into complete blocks plus
//! the trailing partial block that must wait for the next chunk.

use crate::traits::SseParserTrait;

/// Event type used when a block carries no `event:` line.
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// Separator between two complete event blocks.
const BLOCK_SEPARATOR: &str = "\n\n";

/// One parsed Server-Sent Event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event type, `"message"` unless the block set one
    pub event_type: String,
    /// Data payload (multiple `data:` lines are joined with `\n`)
    pub data: String,
    /// Optional event id
    pub id: Option<String>,
    /// Optional reconnection delay in milliseconds
    pub retry: Option<u64>,
}

impl SseEvent {
    /// Create a `message` event with the given data.
    pub fn message(data: impl Into<String>) -> Self {
        Self {
            event_type: DEFAULT_EVENT_TYPE.to_string(),
            data: data.into(),
            id: None,
            retry: None,
        }
    }

    /// Whether the backend flagged this event as an error.
    pub fn is_error(&self) -> bool {
        self.event_type == "error"
    }
}

/// Result of one buffer-processing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseParseResult {
    /// Events parsed from every complete block, in arrival order
    pub events: Vec<SseEvent>,
    /// Trailing text that does not yet form a complete block
    pub remaining_buffer: String,
}

/// A single classified SSE line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// Blank line - ends the current event
    Empty,
    /// Comment line (starts with ':')
    Comment(&'a str),
    /// `field: value` pair
    Field { name: &'a str, value: &'a str },
}

/// Classify one line (without its line terminator).
///
/// A single space after the colon is part of the separator and is removed;
/// any further whitespace belongs to the value.
pub fn parse_sse_line(line: &str) -> SseLine<'_> {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(comment) = line.strip_prefix(':') {
        return SseLine::Comment(comment.trim());
    }

    match line.split_once(':') {
        Some((name, value)) => SseLine::Field {
            name,
            value: value.strip_prefix(' ').unwrap_or(value),
        },
        None => SseLine::Field {
            name: line,
            value: "",
        },
    }
}

/// Stateful parser that accumulates lines and emits complete events.
#[derive(Debug, Default)]
pub struct SseParser {
    event_type: Option<String>,
    data_lines: Vec<String>,
    id: Option<String>,
    retry: Option<u64>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a line to the parser.
    ///
    /// Returns `Some(event)` when the line was blank and the pending event
    /// carried data, `None` otherwise.
    pub fn feed_line(&mut self, line: &str) -> Option<SseEvent> {
        match parse_sse_line(line) {
            SseLine::Empty => self.finish_event(),
            SseLine::Comment(_) => None,
            SseLine::Field { name, value } => {
                match name {
                    "event" => self.event_type = Some(value.to_string()),
                    "data" => self.data_lines.push(value.to_string()),
                    "id" => self.id = Some(value.to_string()),
                    "retry" => self.retry = value.trim().parse().ok(),
                    other => tracing::trace!("Ignoring unknown SSE field: {}", other),
                }
                None
            }
        }
    }

    /// Finalize the pending event, discarding it if it has no data.
    fn finish_event(&mut self) -> Option<SseEvent> {
        let data = self.data_lines.join("\n");
        let event_type = self.event_type.take();
        let id = self.id.take();
        let retry = self.retry.take();
        self.data_lines.clear();

        if data.is_empty() {
            return None;
        }

        Some(SseEvent {
            event_type: event_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string()),
            data,
            id,
            retry,
        })
    }

    /// Drop any partially accumulated event.
    pub fn reset(&mut self) {
        self.event_type = None;
        self.data_lines.clear();
        self.id = None;
        self.retry = None;
    }
}

/// Parse every event in `block`.
///
/// Only events terminated by a blank line are returned; a trailing record
/// without one is left unfinished and dropped.
pub fn parse_sse_events(block: &str) -> Vec<SseEvent> {
    parse_sse_events_with(&mut SseParser::new(), block)
}

/// Parse `block` line by line through any [`SseParserTrait`] implementation.
///
/// The parser keeps whatever record is still open when the block ends.
pub fn parse_sse_events_with<P>(parser: &mut P, block: &str) -> Vec<SseEvent>
where
    P: SseParserTrait + ?Sized,
{
    normalize_line_endings(block)
        .split('\n')
        .filter_map(|line| parser.feed_line(line))
        .collect()
}

/// Split accumulated stream text into complete events and a remainder.
///
/// Every segment followed by a blank line is a complete block. The blank
/// line is consumed by the split, so one is put back before the block is
/// handed to [`parse_sse_events`]. The final segment is returned untouched
/// as `remaining_buffer`.
pub fn process_sse_buffer(buffer: &str) -> SseParseResult {
    process_sse_buffer_with(&mut SseParser::new(), buffer)
}

/// [`process_sse_buffer`] with the line parsing done by `parser`.
///
/// Each complete block ends with a blank line, so the parser holds no open
/// record between calls and can be reused across chunks.
pub fn process_sse_buffer_with<P>(parser: &mut P, buffer: &str) -> SseParseResult
where
    P: SseParserTrait + ?Sized,
{
    let normalized = normalize_line_endings(buffer);
    let mut segments: Vec<&str> = normalized.split(BLOCK_SEPARATOR).collect();
    let remaining_buffer = segments.pop().unwrap_or_default().to_string();

    let mut events = Vec::new();
    for segment in segments {
        if segment.is_empty() {
            continue;
        }
        let mut block = String::with_capacity(segment.len() + BLOCK_SEPARATOR.len());
        block.push_str(segment);
        block.push_str(BLOCK_SEPARATOR);
        events.extend(parse_sse_events_with(&mut *parser, &block));
    }

    SseParseResult {
        events,
        remaining_buffer,
    }
}

/// Convert `\r\n` and lone `\r` terminators to `\n`.
///
/// A `\r` at the very end is kept as-is: its `\n` may still be in flight.
fn normalize_line_endings(text: &str) -> std::borrow::Cow<'_, str> {
    if !text.contains('\r') {
        return std::borrow::Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\r' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('\n') => {
                chars.next();
                out.push('\n');
            }
            Some(_) => out.push('\n'),
            None => out.push('\r'),
        }
    }
    std::borrow::Cow::Owned(out)
}
