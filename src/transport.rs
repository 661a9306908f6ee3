//! Transport boundary to the search backend
//!
//! A transport moves encoded intents to the backend and hands back the raw
//! body. Encoding, decoding and every protocol rule live in the codec.

mod error;
mod http;

pub use error::{TransportError, TransportErrorKind};
pub use http::{HttpTransport, SEARCH_PATH};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Carries one encoded intent to the backend
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Send a JSON request body and return the JSON response body
    async fn send(&self, body: Vec<u8>) -> Result<Vec<u8>, TransportError>;

    /// Where requests go, for logs
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: SearchTransport + ?Sized> SearchTransport for Arc<T> {
    async fn send(&self, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        (**self).send(body).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for transports
pub struct LoggingTransport {
    inner: Arc<dyn SearchTransport>,
    endpoint: String,
}

impl LoggingTransport {
    pub fn new(inner: Arc<dyn SearchTransport>) -> Self {
        let endpoint = inner.endpoint().to_string();
        Self { inner, endpoint }
    }
}

#[async_trait]
impl SearchTransport for LoggingTransport {
    async fn send(&self, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let request_bytes = body.len();
        let start = Instant::now();
        let result = self.inner.send(body).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    request_bytes,
                    response_bytes = response.len(),
                    "Search request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    status = ?e.status,
                    transient = e.kind.is_transient(),
                    "Search request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
