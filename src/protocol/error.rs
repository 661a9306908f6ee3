//! Codec error types

use thiserror::Error;

/// Failure to build, encode or decode a protocol message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Outbound request is malformed; it is never dispatched
    #[error("invalid intent: {0}")]
    Validation(String),
    /// Inbound payload is not well-formed JSON or lacks a required field
    #[error("malformed response: {0}")]
    Decode(String),
    /// Inbound payload parses but breaks the envelope contract
    #[error("response violates schema: {0}")]
    Schema(String),
}

impl CodecError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Stable label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Decode(_) => "decode",
            Self::Schema(_) => "schema",
        }
    }
}
