//! Append-only per-room chat log.

use crate::error::RegistryError;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Stored chat record.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// 1-based position in the room's log.
    id: u64,
    /// Message body.
    text: String,
    sender_id: String,
    display_name: String,
    /// Server receive time.
    timestamp: DateTime<Utc>,
}

/// Message as submitted by a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct NewChatMessage {
    /// Message body.
    #[serde(default)]
    pub text: String,
    /// Sender's player id.
    #[serde(default)]
    pub sender_id: String,
    /// Sender's display name.
    #[serde(default)]
    pub display_name: String,
}

/// Chat logs keyed by room. Logs are created on first append and never
/// reordered or deduplicated.
#[derive(Debug, Default)]
pub struct ChatLog {
    rooms: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl ChatLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for empty text or sender id.
    #[instrument(skip(self, message), fields(sender_id = %message.sender_id))]
    pub async fn append(
        &self,
        room: &str,
        message: NewChatMessage,
    ) -> Result<ChatMessage, RegistryError> {
        if message.text.is_empty() {
            return Err(RegistryError::missing_field("text"));
        }
        if message.sender_id.is_empty() {
            return Err(RegistryError::missing_field("senderId"));
        }

        let mut rooms = self.rooms.write().await;
        let log = rooms.entry(room.to_string()).or_default();
        let record = ChatMessage {
            id: log.len() as u64 + 1,
            text: message.text,
            sender_id: message.sender_id,
            display_name: message.display_name,
            timestamp: Utc::now(),
        };
        log.push(record.clone());
        debug!(id = record.id, "Chat message stored");
        Ok(record)
    }

    /// Returns a room's messages in append order.
    pub async fn list(&self, room: &str) -> Vec<ChatMessage> {
        self.rooms
            .read()
            .await
            .get(room)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryErrorKind;

    #[tokio::test]
    async fn test_append_then_list_in_order() {
        let log = ChatLog::new();
        for text in ["hi", "hello", "hi"] {
            log.append("room1", NewChatMessage::new(text.into(), "p1".into(), "Alice".into()))
                .await
                .unwrap();
        }
        let messages = log.list("room1").await;
        let texts: Vec<_> = messages.iter().map(|m| m.text().as_str()).collect();
        assert_eq!(texts, ["hi", "hello", "hi"]);
        let ids: Vec<_> = messages.iter().map(|m| *m.id()).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_rooms_are_independent() {
        let log = ChatLog::new();
        log.append("a", NewChatMessage::new("x".into(), "p1".into(), "Alice".into()))
            .await
            .unwrap();
        assert!(log.list("b").await.is_empty());
        assert_eq!(log.list("a").await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let log = ChatLog::new();
        let err = log
            .append("a", NewChatMessage::new(String::new(), "p1".into(), "Alice".into()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, RegistryErrorKind::MissingField("text"));
    }
}
