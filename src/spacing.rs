//! Token spacing and accumulation.
//!
//! Some backends stream bare words without separating whitespace. The
//! accumulator joins them with a single space unless the new token is
//! punctuation that attaches to the previous word, or whitespace is
//! already present on either side.

use crate::token::StreamingToken;

/// Characters that attach to the preceding text without a space.
const HUGGING_PUNCTUATION: &[char] = &[
    ',', '.', '!', '?', ':', ';', ')', ']', '}', '"', '\'', '\u{201D}', '\u{2019}', '\u{00BB}',
];

/// Decide whether a space goes between `accumulated` and `token`.
pub fn needs_space(accumulated: &str, token: &str) -> bool {
    let (Some(last), Some(first)) = (accumulated.chars().last(), token.chars().next()) else {
        return false;
    };

    if HUGGING_PUNCTUATION.contains(&first) {
        return false;
    }

    !last.is_whitespace() && !first.is_whitespace()
}

/// Append `token` to `accumulated`, inserting a space when needed.
pub fn append_token(accumulated: &str, token: &str) -> String {
    let mut text = String::with_capacity(accumulated.len() + token.len() + 1);
    text.push_str(accumulated);
    if needs_space(accumulated, token) {
        text.push(' ');
    }
    text.push_str(token);
    text
}

/// Running full text for one streamed reply.
///
/// Each request owns its own accumulator; nothing here is shared.
#[derive(Debug, Default, Clone)]
pub struct TokenAccumulator {
    full_text: String,
    tokens_seen: usize,
}

impl TokenAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a token into the running text.
    ///
    /// `on_token(content, full_text)` fires for every token with visible
    /// content, and for an empty token only when it finishes the stream.
    pub fn push<F>(&mut self, token: &StreamingToken, mut on_token: F) -> &str
    where
        F: FnMut(&str, &str),
    {
        if token.content.is_empty() {
            if token.is_complete {
                on_token("", &self.full_text);
            }
            return &self.full_text;
        }

        if needs_space(&self.full_text, &token.content) {
            self.full_text.push(' ');
        }
        self.full_text.push_str(&token.content);
        self.tokens_seen += 1;

        on_token(&token.content, &self.full_text);
        &self.full_text
    }

    /// Current accumulated text.
    pub fn text(&self) -> &str {
        &self.full_text
    }

    /// Number of non-empty tokens folded in so far.
    pub fn tokens_seen(&self) -> usize {
        self.tokens_seen
    }

    /// Start over for a new request.
    pub fn reset(&mut self) {
        self.full_text.clear();
        self.tokens_seen = 0;
    }

    pub fn into_text(self) -> String {
        self.full_text
    }
}
