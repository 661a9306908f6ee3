//! Mock transport for runtime tests
//!
//! Replays queued backend outcomes and records every body it was handed.

use crate::protocol::{decode_request, IntentRequest};
use crate::transport::{SearchTransport, TransportError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Transport
// ============================================================================

/// Transport that returns queued responses
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Vec<u8>, TransportError>>>,
    /// Raw bodies in the order they were sent
    bodies: Mutex<Vec<Vec<u8>>>,
    /// When set, every send waits for a permit before answering
    gate: Option<Arc<Notify>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose sends block until `release` is called
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::new()
        }
    }

    /// Let one blocked send proceed
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn queue_body(&self, body: Vec<u8>) {
        self.responses.lock().unwrap().push_back(Ok(body));
    }

    pub fn queue_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Requests sent so far, decoded
    pub fn recorded_requests(&self) -> Vec<IntentRequest> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .map(|body| decode_request(body).unwrap())
            .collect()
    }
}

#[async_trait]
impl SearchTransport for MockTransport {
    async fn send(&self, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        self.bodies.lock().unwrap().push(body);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("No mock response queued")))
    }

    fn endpoint(&self) -> &str {
        "mock://search"
    }
}

// ============================================================================
// Body builders
// ============================================================================

/// A ranked hit as it appears on the wire
pub fn hit(name: &str, score: f64) -> Value {
    json!({
        "project": { "id": 1, "name": name, "description": "", "type": "web" },
        "relevance_score": score,
        "matching_features": []
    })
}

/// A response body carrying the results arm
pub fn results_body(results: &[Value], ttl: u64) -> Vec<u8> {
    json!({
        "request_id": uuid::Uuid::new_v4().to_string(),
        "response": { "results": results },
        "metadata": { "source": "mock", "timestamp": 0, "ttl": ttl, "extra": {} }
    })
    .to_string()
    .into_bytes()
}
