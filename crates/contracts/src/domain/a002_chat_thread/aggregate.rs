use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shown when the service answers without an `answer` field.
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response received.";

/// Role of a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Single-flight guard of the send action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendState {
    #[default]
    Idle,
    InFlight,
}

/// Append-only message list of one page lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatThread {
    messages: Vec<ChatMessage>,
    send_state: SendState,
}

impl ChatThread {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_sending(&self) -> bool {
        self.send_state == SendState::InFlight
    }

    /// Append the user's message and enter the in-flight state.
    ///
    /// Returns the query to dispatch, or `None` for blank input or while a
    /// previous send is outstanding.
    pub fn begin_send(&mut self, text: &str) -> Option<String> {
        let query = text.trim();
        if query.is_empty() || self.is_sending() {
            return None;
        }
        self.messages.push(ChatMessage::user(query));
        self.send_state = SendState::InFlight;
        Some(query.to_string())
    }

    /// Append the reply (or the error text) as an assistant message.
    pub fn finish_send(&mut self, result: Result<Option<String>, String>) {
        if !self.is_sending() {
            return;
        }
        let content = match result {
            Ok(Some(answer)) if !answer.is_empty() => answer,
            Ok(_) => NO_RESPONSE_PLACEHOLDER.to_string(),
            Err(message) => message,
        };
        self.messages.push(ChatMessage::assistant(content));
        self.send_state = SendState::Idle;
    }
}
