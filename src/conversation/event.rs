//! Events that drive the conversation

use crate::protocol::{CodecError, IntentResponse};
use crate::transport::TransportErrorKind;
use std::fmt;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit {
        query: String,
    },

    // Dispatch outcomes
    DispatchSucceeded {
        response: IntentResponse,
        /// Served from the response cache without touching the transport
        from_cache: bool,
    },
    DispatchFailed {
        reason: FailureReason,
        message: String,
    },
}

impl Event {
    pub fn submit(query: impl Into<String>) -> Self {
        Event::Submit {
            query: query.into(),
        }
    }

    pub fn failed(reason: FailureReason, message: impl Into<String>) -> Self {
        Event::DispatchFailed {
            reason,
            message: message.into(),
        }
    }

    /// Whether this event resolves an in-flight dispatch
    pub fn is_resolution(&self) -> bool {
        !matches!(self, Event::Submit { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::Submit { .. } => "submit",
            Event::DispatchSucceeded { .. } => "dispatch_succeeded",
            Event::DispatchFailed { .. } => "dispatch_failed",
        }
    }
}

/// Why a dispatch failed; the transcript does not distinguish these
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Transport(TransportErrorKind),
    Encode,
    Decode,
    Schema,
}

impl From<&CodecError> for FailureReason {
    fn from(err: &CodecError) -> Self {
        match err {
            CodecError::Validation(_) => FailureReason::Encode,
            CodecError::Decode(_) => FailureReason::Decode,
            CodecError::Schema(_) => FailureReason::Schema,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Transport(kind) => write!(f, "transport ({kind:?})"),
            FailureReason::Encode => f.write_str("encode"),
            FailureReason::Decode => f.write_str("decode"),
            FailureReason::Schema => f.write_str("schema"),
        }
    }
}
