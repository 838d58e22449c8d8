//! Chat data models
//!
//! Defines messages and the per-agent conversation mapping.

use crate::state::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Agent id -> messages in insertion order
pub type Conversations = BTreeMap<AgentId, Vec<Message>>;

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user
    User,
    /// Message from the assistant/AI
    Assistant,
}

impl MessageRole {
    /// Convert the role to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
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

/// A single message in an agent's conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier for the message
    pub id: String,
    /// Agent this message belongs to
    pub agent_id: AgentId,
    /// Content of the message
    pub content: String,
    /// Role of the message sender
    pub role: MessageRole,
    /// When the message was appended
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message with a fresh id
    pub fn new(
        agent_id: AgentId,
        content: String,
        role: MessageRole,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            agent_id,
            content,
            role,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
        let role: MessageRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, MessageRole::User);
        assert!(serde_json::from_str::<MessageRole>("\"system\"").is_err());
    }

    #[test]
    fn test_message_layout() {
        let message = Message::new(
            "a1".to_string(),
            "hi".to_string(),
            MessageRole::User,
            Utc::now(),
        );
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["agentId"], "a1");
        assert_eq!(json["role"], "user");
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_message_ids_unique() {
        let now = Utc::now();
        let a = Message::new("a".into(), "x".into(), MessageRole::User, now);
        let b = Message::new("a".into(), "x".into(), MessageRole::User, now);
        assert_ne!(a.id, b.id);
    }
}
