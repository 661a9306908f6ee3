//! Request construction and response decoding
//!
//! Both directions are pure: no I/O, no clock. The transport only moves the
//! bytes this module produces and consumes.

use super::error::CodecError;
use super::filters::extract_filters;
use super::request::{
    Action, AuthInfo, IntentRequest, DEFAULT_SCOPE, PROTOCOL_VERSION, QUERY_PARAM,
    RESPONSE_FORMAT_JSON,
};
use super::response::{IntentResponse, ProjectSearchResult, ResponsePayload, WireResponse};
use serde_json::Value;
use std::collections::BTreeMap;

/// Envelope settings shared by every request a client sends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentTemplate {
    version: String,
    scope: String,
    auth: AuthInfo,
    extract_filters: bool,
}

impl IntentTemplate {
    pub fn new(auth: AuthInfo) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            auth,
            extract_filters: false,
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Enrich search parameters with filters guessed from the query text
    #[must_use]
    pub fn with_filter_extraction(mut self, enabled: bool) -> Self {
        self.extract_filters = enabled;
        self
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn auth(&self) -> &AuthInfo {
        &self.auth
    }

    /// Build a `BUSCAR` intent for free-text input.
    ///
    /// The query is trimmed; whitespace-only input is a validation error.
    pub fn search(&self, query: &str) -> Result<IntentRequest, CodecError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CodecError::validation("query must not be empty"));
        }

        let mut parameters = if self.extract_filters {
            extract_filters(query)
        } else {
            BTreeMap::new()
        };
        parameters.insert(QUERY_PARAM.to_string(), query.to_string());

        self.intent(Action::Buscar, parameters)
    }

    /// Build an intent for any action with explicit parameters
    pub fn intent(
        &self,
        action: Action,
        parameters: BTreeMap<String, String>,
    ) -> Result<IntentRequest, CodecError> {
        let request = IntentRequest {
            version: self.version.clone(),
            action,
            scope: self.scope.clone(),
            parameters,
            response_format: RESPONSE_FORMAT_JSON.to_string(),
            auth_info: self.auth.clone(),
        };
        validate_request(&request)?;
        Ok(request)
    }
}

/// Build a search intent authenticated with a bearer token
pub fn build_search_intent(query: &str, auth_token: &str) -> Result<IntentRequest, CodecError> {
    IntentTemplate::new(AuthInfo::token(auth_token)).search(query)
}

/// Check the envelope invariants of an outbound request
pub fn validate_request(request: &IntentRequest) -> Result<(), CodecError> {
    if request.version.trim().is_empty() {
        return Err(CodecError::validation("version must not be empty"));
    }
    if request.scope.trim().is_empty() {
        return Err(CodecError::validation("scope must not be empty"));
    }
    if request.response_format.trim().is_empty() {
        return Err(CodecError::validation("response_format must not be empty"));
    }
    if request.action.is_search() && request.query().is_none_or(|q| q.trim().is_empty()) {
        return Err(CodecError::validation(format!(
            "{} intents require a non-empty `{QUERY_PARAM}` parameter",
            request.action
        )));
    }
    Ok(())
}

/// Validate and serialize a request body
pub fn encode_request(request: &IntentRequest) -> Result<Vec<u8>, CodecError> {
    validate_request(request)?;
    serde_json::to_vec(request)
        .map_err(|e| CodecError::validation(format!("cannot serialize intent: {e}")))
}

/// Parse and validate a request body (server side)
pub fn decode_request(raw: &[u8]) -> Result<IntentRequest, CodecError> {
    let request: IntentRequest =
        serde_json::from_slice(raw).map_err(|e| CodecError::decode(e.to_string()))?;
    validate_request(&request)?;
    Ok(request)
}

/// Parse and validate a response body
pub fn decode_response(raw: &[u8]) -> Result<IntentResponse, CodecError> {
    let wire: WireResponse =
        serde_json::from_slice(raw).map_err(|e| CodecError::decode(e.to_string()))?;
    IntentResponse::try_from(wire)
}

/// Validate a response that has already been parsed into a JSON value
pub fn decode_response_value(raw: Value) -> Result<IntentResponse, CodecError> {
    let wire: WireResponse =
        serde_json::from_value(raw).map_err(|e| CodecError::decode(e.to_string()))?;
    IntentResponse::try_from(wire)
}

/// Ranked results carried by a response.
///
/// Empty for every arm other than `results`, including `error`: check
/// [`IntentResponse::is_error`] to tell "no matches" from "request failed".
pub fn extract_results(response: &IntentResponse) -> &[ProjectSearchResult] {
    match &response.response {
        ResponsePayload::Results(results) => results,
        _ => &[],
    }
}

/// True when relevance never increases down the list
pub fn is_ranked(results: &[ProjectSearchResult]) -> bool {
    results
        .windows(2)
        .all(|pair| pair[0].relevance_score >= pair[1].relevance_score)
}
