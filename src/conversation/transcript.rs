//! Append-only message transcript

use crate::protocol::IntentResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Bot,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Response that produced this entry, kept for inspection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<IntentResponse>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(kind: MessageKind, text: impl Into<String>, response: Option<IntentResponse>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            kind,
            response,
            created_at: Utc::now(),
        }
    }
}

/// Ordered log of the conversation. Entries can be appended, never edited.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) -> &Message {
        self.entries.push(message);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.entries.last()
    }

    /// Entries of one kind, in order
    pub fn of_kind(&self, kind: MessageKind) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter(move |m| m.kind == kind)
    }
}
