//! Conversation controller
//!
//! Pure state transitions (Elm Architecture) plus a runtime that executes the
//! resulting effects against a transport.

mod effect;
pub mod event;
mod runtime;
mod state;
mod transcript;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use effect::Effect;
pub use event::{Event, FailureReason};
pub use runtime::{ConversationHandle, ConversationRuntime, ConversationUpdate, RuntimeStopped};
pub use state::{ConvContext, ConvState};
pub use transcript::{Message, MessageKind, Transcript};
pub use transition::{acknowledgment, transition, TransitionError, TransitionResult, FALLBACK_TEXT};
