//! Effects produced by state transitions

use super::transcript::MessageKind;
use crate::protocol::{IntentRequest, IntentResponse, ProjectSearchResult};

/// Effects to be executed after state transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Append an entry to the transcript
    AppendMessage {
        kind: MessageKind,
        text: String,
        response: Option<IntentResponse>,
    },

    /// Send an intent to the backend (spawns as background task)
    Dispatch { request: IntentRequest },

    /// Replace the visible ranked result list
    ReplaceResults { results: Vec<ProjectSearchResult> },

    /// Notify observers of the new state
    NotifyState,
}

impl Effect {
    pub fn user_message(text: impl Into<String>) -> Self {
        Effect::AppendMessage {
            kind: MessageKind::User,
            text: text.into(),
            response: None,
        }
    }

    pub fn bot_message(text: impl Into<String>, response: Option<IntentResponse>) -> Self {
        Effect::AppendMessage {
            kind: MessageKind::Bot,
            text: text.into(),
            response,
        }
    }
}
