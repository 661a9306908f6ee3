//! Response cache honoring the backend's `metadata.ttl`

use crate::protocol::{Action, IntentRequest, IntentResponse};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

/// Upper bound on how long any response is kept, whatever the backend asks for
pub const MAX_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Identity of an intent for caching; auth is not part of the key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    action: Action,
    scope: String,
    parameters: BTreeMap<String, String>,
}

impl From<&IntentRequest> for CacheKey {
    fn from(request: &IntentRequest) -> Self {
        Self {
            action: request.action,
            scope: request.scope.clone(),
            parameters: request.parameters.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    response: IntentResponse,
    expires_at: Instant,
}

/// In-memory cache of decoded responses
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: HashMap<CacheKey, CacheEntry>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh response for this request, if any
    pub fn get(&mut self, request: &IntentRequest) -> Option<IntentResponse> {
        self.get_at(request, Instant::now())
    }

    /// Store a response for its advertised TTL.
    ///
    /// Error responses and responses with a zero TTL are not cached.
    pub fn insert(&mut self, request: &IntentRequest, response: &IntentResponse) {
        self.insert_at(request, response, Instant::now());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_at(&mut self, request: &IntentRequest, now: Instant) -> Option<IntentResponse> {
        let key = CacheKey::from(request);
        match self.entries.get(&key) {
            Some(entry) if now < entry.expires_at => Some(entry.response.clone()),
            Some(_) => {
                self.entries.remove(&key);
                None
            }
            None => None,
        }
    }

    fn insert_at(&mut self, request: &IntentRequest, response: &IntentResponse, now: Instant) {
        let ttl = response.metadata.ttl_duration().min(MAX_TTL);
        if response.is_error() || ttl == Duration::ZERO {
            return;
        }
        let Some(expires_at) = now.checked_add(ttl) else {
            return;
        };
        self.entries.retain(|_, entry| now < entry.expires_at);
        self.entries.insert(
            CacheKey::from(request),
            CacheEntry {
                response: response.clone(),
                expires_at,
            },
        );
    }
}
