//! Conversation state types

use crate::protocol::IntentTemplate;
use serde::Serialize;

/// Controller state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// Ready for user input, no request in flight
    #[default]
    Idle,

    /// One intent in flight; further submissions are rejected
    Dispatching {
        /// Trimmed query that produced the in-flight intent
        query: String,
    },
}

impl ConvState {
    pub fn is_dispatching(&self) -> bool {
        matches!(self, ConvState::Dispatching { .. })
    }

    /// Short name for logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            ConvState::Idle => "idle",
            ConvState::Dispatching { .. } => "dispatching",
        }
    }
}

/// Immutable configuration of a conversation
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub conversation_id: String,
    /// Envelope every intent of this conversation is built from
    pub template: IntentTemplate,
}

impl ConvContext {
    pub fn new(conversation_id: impl Into<String>, template: IntentTemplate) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            template,
        }
    }
}
