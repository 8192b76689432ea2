//! SSE (Server-Sent Events) parser trait abstraction.
//!
//! Provides a trait-based abstraction for line-level SSE parsing so a
//! different parser can be swapped in behind [`crate::sse::parse_sse_events_with`].

use crate::sse::SseEvent;

/// Trait for SSE (Server-Sent Events) parsing.
///
/// The parser is stateful: it accumulates `field: value` lines until a blank
/// line finishes the current record.
///
/// # Example
///
/// ```ignore
/// use chairside::traits::SseParserTrait;
///
/// fn drain<P: SseParserTrait>(parser: &mut P, lines: &[&str]) -> usize {
///     lines.iter().filter_map(|line| parser.feed_line(line)).count()
/// }
/// ```
pub trait SseParserTrait: Send {
    /// Feed a line (without its terminator) to the parser.
    ///
    /// Returns `Some(event)` when the line completed an event carrying data.
    fn feed_line(&mut self, line: &str) -> Option<SseEvent>;

    /// Reset the parser state, dropping any partially accumulated event.
    fn reset(&mut self);
}

impl SseParserTrait for crate::sse::SseParser {
    fn feed_line(&mut self, line: &str) -> Option<SseEvent> {
        crate::sse::SseParser::feed_line(self, line)
    }

    fn reset(&mut self) {
        crate::sse::SseParser::reset(self)
    }
}
