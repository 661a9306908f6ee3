//! Transport error types

use thiserror::Error;

/// Transport failure with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    /// HTTP status, when the backend answered at all
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unknown, message)
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => TransportErrorKind::Auth,
            408 => TransportErrorKind::Timeout,
            429 => TransportErrorKind::RateLimit,
            400..=499 => TransportErrorKind::ClientError,
            500..=599 => TransportErrorKind::ServerError,
            _ => TransportErrorKind::Unknown,
        };
        Self::new(kind, format!("HTTP {status}: {body}")).with_status(status)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, reset, DNS
    Network,
    /// Client-side timeout or 408
    Timeout,
    /// 401, 403
    Auth,
    /// 429
    RateLimit,
    /// Other 4xx
    ClientError,
    /// 5xx
    ServerError,
    Unknown,
}

impl TransportErrorKind {
    /// Whether resending the same intent could succeed
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::RateLimit | Self::ServerError
        )
    }
}
