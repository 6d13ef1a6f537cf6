//! Session domain entities

use crate::session::value_objects::{MessageId, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A reference to a specific chunk of source material, returned by the
/// RAG backend alongside an answer (Value Object)
///
/// Citations are opaque payloads: the content is not validated here, only
/// preserved in order and attached to the message that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub title: String,
    pub chunk_index: u32,
    pub content: String,
}

/// A message in a session (Entity)
///
/// Messages are append-only and strictly ordered by insertion. Only
/// assistant messages carry citations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
}

impl Message {
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: MessageId::generate(),
            role: Role::User,
            content: content.into(),
            timestamp,
            citations: Vec::new(),
        }
    }

    pub fn assistant(
        content: impl Into<String>,
        citations: Vec<Citation>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            role: Role::Assistant,
            content: content.into(),
            timestamp,
            citations,
        }
    }
}

/// A study session (Entity), shown to the user as a "conversation".
///
/// Owns an ordered message log and doubles as the unit of retrieval
/// scoping: material ingested into the backend is tagged with the id of
/// the session it belongs to. The id is assigned once and never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    title: String,
    created_at: DateTime<Utc>,
    messages: Vec<Message>,
}

impl Session {
    pub fn new(title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::generate(),
            title: title.into(),
            created_at,
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append a message to the log. Messages are never reordered or
    /// edited in place; insertion order is the canonical order.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_keep_insertion_order() {
        let now = Utc::now();
        let mut session = Session::new("Topic A", now);
        session.push_message(Message::user("first", now));
        session.push_message(Message::assistant("second", Vec::new(), now));
        session.push_message(Message::user("third", now));

        let contents: Vec<&str> = session
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_citation_wire_shape() {
        let citation = Citation {
            title: "doc1".to_string(),
            chunk_index: 3,
            content: "chunk text".to_string(),
        };
        let json = serde_json::to_value(&citation).unwrap();
        assert_eq!(json["title"], "doc1");
        assert_eq!(json["chunkIndex"], 3);
        assert_eq!(json["content"], "chunk text");
    }

    #[test]
    fn test_user_message_has_no_citations() {
        let msg = Message::user("hello", Utc::now());
        assert!(msg.citations.is_empty());
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("citations").is_none());
    }
}
