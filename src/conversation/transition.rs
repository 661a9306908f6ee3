//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! result: no clock, no I/O. Rejections carry no effects.

use super::{ConvContext, ConvState, Effect, Event};
use crate::protocol::{extract_results, CodecError, IntentResponse, ResponsePayload};
use thiserror::Error;

/// Bot text for any failed dispatch
pub const FALLBACK_TEXT: &str = "Sorry, an error occurred while searching. Please try again.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons a transition is refused
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("A search is already in progress; wait for it to finish")]
    Busy,
    #[error("Query is empty")]
    EmptyQuery,
    #[error(transparent)]
    InvalidIntent(#[from] CodecError),
    #[error("Unexpected {event} while {state}")]
    Unexpected {
        event: &'static str,
        state: &'static str,
    },
}

pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Submission
        // ============================================================

        // At most one request in flight; later submissions are dropped
        (ConvState::Dispatching { .. }, Event::Submit { .. }) => Err(TransitionError::Busy),

        (ConvState::Idle, Event::Submit { query }) => {
            let query = query.trim();
            if query.is_empty() {
                return Err(TransitionError::EmptyQuery);
            }
            let request = context.template.search(query)?;

            Ok(TransitionResult::new(ConvState::Dispatching {
                query: query.to_string(),
            })
            .with_effect(Effect::user_message(query))
            .with_effect(Effect::NotifyState)
            .with_effect(Effect::Dispatch { request }))
        }

        // ============================================================
        // Resolution
        // ============================================================
        (ConvState::Dispatching { query }, Event::DispatchSucceeded { response, .. }) => {
            let text = acknowledgment(query, &response);
            // A backend-reported error keeps the previous results on screen
            let results = (!response.is_error()).then(|| extract_results(&response).to_vec());

            let mut result = TransitionResult::new(ConvState::Idle)
                .with_effect(Effect::bot_message(text, Some(response)));
            if let Some(results) = results {
                result = result.with_effect(Effect::ReplaceResults { results });
            }
            Ok(result.with_effect(Effect::NotifyState))
        }

        (ConvState::Dispatching { .. }, Event::DispatchFailed { .. }) => {
            Ok(TransitionResult::new(ConvState::Idle)
                .with_effect(Effect::bot_message(FALLBACK_TEXT, None))
                .with_effect(Effect::NotifyState))
        }

        // Nothing is in flight, so there is nothing to resolve
        (ConvState::Idle, event) => Err(TransitionError::Unexpected {
            event: event.name(),
            state: state.name(),
        }),
    }
}

/// Bot text for a decoded response
pub fn acknowledgment(query: &str, response: &IntentResponse) -> String {
    match &response.response {
        ResponsePayload::Results(results) if results.is_empty() => {
            format!("No projects matched \"{query}\".")
        }
        ResponsePayload::Results(results) => {
            let noun = if results.len() == 1 { "project" } else { "projects" };
            format!("Found {} {noun} for \"{query}\".", results.len())
        }
        ResponsePayload::Manifest(manifest) if manifest.version.is_empty() => {
            format!("Received the manifest for {}.", manifest.name)
        }
        ResponsePayload::Manifest(manifest) => {
            format!("Received the manifest for {} {}.", manifest.name, manifest.version)
        }
        ResponsePayload::RawData(bytes) => format!("Received {} bytes of raw data.", bytes.len()),
        ResponsePayload::Error(message) => {
            format!("The search service reported an error: {message}")
        }
    }
}
