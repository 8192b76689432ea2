//! Separation of model reasoning from the visible answer.
//!
//! Reasoning models served by the chatbot backend wrap their scratch work in
//! `<think>...</think>` (some use `<thinking>`). The streamed text mixes both,
//! so the caller splits the accumulated text on every update: finished
//! blocks, an unclosed block that is still streaming, and a tag that has
//! only partially arrived at the end of the text.

use once_cell::sync::Lazy;
use regex::Regex;

static THINK_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(?:think|thinking)>(.*?)</(?:think|thinking)>")
        .expect("Invalid think block regex pattern")
});

static THINK_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?:think|thinking)>").expect("Invalid think tag regex pattern"));

const OPEN_TAGS: [&str; 2] = ["<thinking>", "<think>"];

/// Accumulated text split into reasoning and answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThinkingSplit {
    /// Reasoning text, blocks separated by a blank line
    pub thinking: String,
    /// Text meant for the reader
    pub answer: String,
    /// An opening tag has no matching close yet
    pub in_progress: bool,
}

impl ThinkingSplit {
    pub fn has_thinking(&self) -> bool {
        !self.thinking.is_empty()
    }
}

/// Split a finished reply.
pub fn split_thinking(text: &str) -> ThinkingSplit {
    split(text, false)
}

/// Split a reply that is still streaming.
///
/// A trailing fragment that could be the start of an opening tag (`<thi`)
/// is held back from the answer until the next token settles it.
pub fn split_thinking_partial(text: &str) -> ThinkingSplit {
    split(text, true)
}

fn split(text: &str, streaming: bool) -> ThinkingSplit {
    let mut thinking: Vec<&str> = Vec::new();
    let mut answer = String::with_capacity(text.len());
    let mut last = 0;

    for caps in THINK_BLOCK.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        answer.push_str(&text[last..whole.start()]);
        let inner = inner.as_str().trim();
        if !inner.is_empty() {
            thinking.push(inner);
        }
        last = whole.end();
    }

    let rest = &text[last..];
    let mut in_progress = false;
    match THINK_OPEN.find(rest) {
        Some(open) => {
            answer.push_str(&rest[..open.start()]);
            let partial = rest[open.end()..].trim();
            if !partial.is_empty() {
                thinking.push(partial);
            }
            in_progress = true;
        }
        None if streaming => answer.push_str(strip_partial_open_tag(rest)),
        None => answer.push_str(rest),
    }

    ThinkingSplit {
        thinking: thinking.join("\n\n"),
        answer: answer.trim().to_string(),
        in_progress,
    }
}

/// Remove a trailing prefix of an opening tag.
fn strip_partial_open_tag(text: &str) -> &str {
    for tag in OPEN_TAGS {
        for len in (1..tag.len()).rev() {
            if text.ends_with(&tag[..len]) {
                return &text[..text.len() - len];
            }
        }
    }
    text
}
