//! In-memory chat session.
//!
//! A session is one conversation with one assistant. Its id is generated
//! once, sent with every request to context-bearing assistants, and never
//! changes. The transcript is kept in memory only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::ChatType;
use crate::thinking::{split_thinking, split_thinking_partial};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One message in the transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    /// Visible text (reasoning removed)
    pub content: String,
    /// Reasoning extracted from `<think>` blocks
    #[serde(default)]
    pub reasoning_content: String,
    pub created_at: DateTime<Utc>,
    /// Whether the message is currently being streamed
    #[serde(default)]
    pub is_streaming: bool,
    /// Whether the content is an error shown in place of a reply
    #[serde(default)]
    pub is_error: bool,
}

impl ChatMessage {
    fn new(role: MessageRole, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            reasoning_content: String::new(),
            created_at: Utc::now(),
            is_streaming: false,
            is_error: false,
        }
    }

    /// Whether the reply is still inside an unclosed reasoning block.
    pub fn is_thinking(&self) -> bool {
        self.is_streaming && self.content.is_empty() && !self.reasoning_content.is_empty()
    }
}

/// One conversation with one assistant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatSession {
    id: Uuid,
    chat_type: ChatType,
    created_at: DateTime<Utc>,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Start a new session with a fresh id.
    pub fn new(chat_type: ChatType) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            chat_type,
            created_at: Utc::now(),
            messages: Vec::new(),
        };
        tracing::debug!("Started {} session {}", chat_type, session.id);
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn chat_type(&self) -> ChatType {
        self.chat_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Record what the user sent.
    pub fn add_user_message(&mut self, content: impl Into<String>) -> Uuid {
        let message = ChatMessage::new(MessageRole::User, content.into());
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Add an empty assistant message that tokens will stream into.
    pub fn begin_assistant_message(&mut self) -> Uuid {
        let mut message = ChatMessage::new(MessageRole::Assistant, String::new());
        message.is_streaming = true;
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Replace a streaming message's text with the latest accumulated text.
    ///
    /// Returns `false` if the message does not exist or has finished.
    pub fn update_streaming(&mut self, id: Uuid, full_text: &str) -> bool {
        let Some(message) = self.streaming_message_mut(id) else {
            return false;
        };
        let split = split_thinking_partial(full_text);
        message.content = split.answer;
        message.reasoning_content = split.thinking;
        true
    }

    /// Mark a streaming message finished with its final text.
    pub fn finish_streaming(&mut self, id: Uuid, full_text: &str) -> bool {
        let Some(message) = self.streaming_message_mut(id) else {
            return false;
        };
        let split = split_thinking(full_text);
        message.content = split.answer;
        message.reasoning_content = split.thinking;
        message.is_streaming = false;
        true
    }

    /// Replace a streaming message with an error text and finish it.
    pub fn fail_streaming(&mut self, id: Uuid, error_text: &str) -> bool {
        let Some(message) = self.streaming_message_mut(id) else {
            return false;
        };
        message.content = error_text.to_string();
        message.reasoning_content.clear();
        message.is_streaming = false;
        message.is_error = true;
        true
    }

    /// Drop a streaming message, e.g. after the user cancelled it.
    pub fn discard_streaming(&mut self, id: Uuid) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| !(m.id == id && m.is_streaming));
        self.messages.len() != before
    }

    fn streaming_message_mut(&mut self, id: Uuid) -> Option<&mut ChatMessage> {
        self.messages
            .iter_mut()
            .find(|m| m.id == id && m.is_streaming)
    }
}
