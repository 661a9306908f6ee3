//! Inbound result envelope

use super::error::CodecError;
use super::manifest::ReadmeProto;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Project record as denormalized by the search backend.
///
/// Older backends emit Portuguese keys; both spellings decode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: u64,
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(alias = "descricao")]
    pub description: String,
    #[serde(rename = "type", alias = "tipo")]
    pub kind: String,
    #[serde(alias = "imagens")]
    pub images: Vec<String>,
    #[serde(alias = "nivel")]
    pub level: u32,
    #[serde(alias = "repositorio")]
    pub repository_url: String,
    #[serde(alias = "destaque")]
    pub featured: bool,
}

/// One ranked hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSearchResult {
    pub project: Project,
    /// Higher is more relevant; only comparable within one result list
    pub relevance_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matching_features: Vec<String>,
}

/// Exactly one populated arm of a response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePayload {
    Manifest(ReadmeProto),
    Error(String),
    RawData(#[serde(serialize_with = "base64_bytes::serialize")] Vec<u8>),
    Results(Vec<ProjectSearchResult>),
}

impl ResponsePayload {
    /// Wire name of the populated arm
    pub fn arm(&self) -> &'static str {
        match self {
            ResponsePayload::Manifest(_) => "manifest",
            ResponsePayload::Error(_) => "error",
            ResponsePayload::RawData(_) => "raw_data",
            ResponsePayload::Results(_) => "results",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseMetadata {
    /// Origin identifier
    pub source: String,
    /// Emission time, unix seconds
    pub timestamp: i64,
    /// Validity for caching, seconds
    pub ttl: u64,
    pub extra: BTreeMap<String, String>,
}

impl ResponseMetadata {
    pub fn ttl_duration(&self) -> Duration {
        Duration::from_secs(self.ttl)
    }

    pub fn emitted_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Decoded and validated backend response.
///
/// Deserialization always goes through the arm-count check, so a value of
/// this type never carries zero or several populated arms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireResponse")]
pub struct IntentResponse {
    pub request_id: String,
    pub response: ResponsePayload,
    pub metadata: ResponseMetadata,
}

impl IntentResponse {
    pub fn new(
        request_id: impl Into<String>,
        response: ResponsePayload,
        metadata: ResponseMetadata,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            response,
            metadata,
        }
    }

    /// Backend-reported failure message, if this is the error arm
    pub fn error_message(&self) -> Option<&str> {
        match &self.response {
            ResponsePayload::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_message().is_some()
    }

    pub fn manifest(&self) -> Option<&ReadmeProto> {
        match &self.response {
            ResponsePayload::Manifest(manifest) => Some(manifest),
            _ => None,
        }
    }
}

// ============================================================================
// Wire representation
// ============================================================================

/// Response union as it appears on the wire: every arm optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WirePayload {
    manifest: Option<ReadmeProto>,
    error: Option<String>,
    #[serde(deserialize_with = "base64_bytes::deserialize_option")]
    raw_data: Option<Vec<u8>>,
    results: Option<Vec<ProjectSearchResult>>,
}

impl WirePayload {
    fn populated_arms(&self) -> Vec<&'static str> {
        let mut arms = Vec::new();
        if self.manifest.is_some() {
            arms.push("manifest");
        }
        if self.error.is_some() {
            arms.push("error");
        }
        if self.raw_data.is_some() {
            arms.push("raw_data");
        }
        if self.results.is_some() {
            arms.push("results");
        }
        arms
    }

    fn into_payload(self) -> Option<ResponsePayload> {
        self.manifest
            .map(ResponsePayload::Manifest)
            .or(self.error.map(ResponsePayload::Error))
            .or(self.raw_data.map(ResponsePayload::RawData))
            .or(self.results.map(ResponsePayload::Results))
    }
}

#[derive(Debug, Deserialize)]
pub struct WireResponse {
    request_id: String,
    response: WirePayload,
    metadata: ResponseMetadata,
    /// Legacy placement of the result list, outside the union
    #[serde(default)]
    results: Option<Vec<ProjectSearchResult>>,
}

impl TryFrom<WireResponse> for IntentResponse {
    type Error = CodecError;

    fn try_from(wire: WireResponse) -> Result<Self, Self::Error> {
        let WireResponse {
            request_id,
            mut response,
            metadata,
            results,
        } = wire;

        if let Some(results) = results {
            if response.results.is_some() {
                return Err(CodecError::schema(
                    "results present both at top level and inside response",
                ));
            }
            tracing::debug!(
                request_id = %request_id,
                count = results.len(),
                "Folding top-level results into response union"
            );
            response.results = Some(results);
        }

        let arms = response.populated_arms();
        match arms.len() {
            0 => Err(CodecError::schema("response has no populated arm")),
            1 => {
                let payload = response
                    .into_payload()
                    .ok_or_else(|| CodecError::schema("response has no populated arm"))?;
                Ok(Self {
                    request_id,
                    response: payload,
                    metadata,
                })
            }
            n => Err(CodecError::schema(format!(
                "response has {n} populated arms ({})",
                arms.join(", ")
            ))),
        }
    }
}

/// `raw_data` travels as standard base64 inside JSON
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ptr_arg)] // serde passes the field by reference
    pub fn serialize<S: Serializer>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD
                .decode(encoded)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
