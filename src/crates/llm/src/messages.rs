//! Role-tagged chat messages and the session builder that orders them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions that frame the conversation.
    System,
    /// Caller input.
    User,
    /// Vendor output.
    Assistant,
}

impl MessageRole {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Whether the message carries no text.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A caller request against a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The caller's message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ChatMessage>,
}

impl ChatRequest {
    /// Request carrying a user message.
    pub fn with_user_message(content: impl Into<String>) -> Self {
        Self {
            message: Some(ChatMessage::user(content)),
        }
    }
}

/// Ordered message builder for one vendor call.
///
/// Messages are kept in append order; empty messages are dropped on append.
#[derive(Debug, Clone, Default)]
pub struct Session {
    messages: Vec<ChatMessage>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. Returns `false` if it was empty and skipped.
    pub fn append(&mut self, message: ChatMessage) -> bool {
        if message.is_empty() {
            return false;
        }
        self.messages.push(message);
        true
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The ordered sequence to hand to a vendor.
    pub fn vendor_messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Consume the session, yielding the ordered sequence.
    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_preserves_append_order() {
        let mut session = Session::new();
        assert!(session.append(ChatMessage::system("You are terse.")));
        assert!(session.append(ChatMessage::user("Hello")));

        let roles: Vec<_> = session.vendor_messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![MessageRole::System, MessageRole::User]);
    }

    #[test]
    fn test_session_skips_empty_messages() {
        let mut session = Session::new();
        assert!(!session.append(ChatMessage::user("")));
        assert!(session.is_empty());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&ChatMessage::assistant("ok")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
    }
}
