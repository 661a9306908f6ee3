//! Outbound intent envelope

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Protocol version stamped on every request this client builds
pub const PROTOCOL_VERSION: &str = "1.0";

/// Resource class searched by default
pub const DEFAULT_SCOPE: &str = "projeto";

/// Only serialization this client can consume
pub const RESPONSE_FORMAT_JSON: &str = "json";

/// Parameter key carrying the free-text query of a search intent
pub const QUERY_PARAM: &str = "query";

/// Operation requested by an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// Search
    Buscar,
    /// Create
    Criar,
    /// Update
    Atualizar,
    /// Delete
    Deletar,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Buscar => "BUSCAR",
            Action::Criar => "CRIAR",
            Action::Atualizar => "ATUALIZAR",
            Action::Deletar => "DELETAR",
        }
    }

    /// Search actions must carry a `query` parameter
    pub fn is_search(self) -> bool {
        matches!(self, Action::Buscar)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// NFT ownership credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftAuth {
    pub contract_address: String,
    pub token_id: String,
    pub wallet_address: String,
}

/// Authentication envelope; exactly one mode per request.
///
/// Serializes as `{"token": "..."}` or `{"nft_auth": {...}}`. A payload that
/// populates both keys is rejected on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthInfo {
    Token(String),
    NftAuth(NftAuth),
}

impl AuthInfo {
    pub fn token(token: impl Into<String>) -> Self {
        AuthInfo::Token(token.into())
    }

    /// Mode name for logs (never the credential itself)
    pub fn mode(&self) -> &'static str {
        match self {
            AuthInfo::Token(_) => "token",
            AuthInfo::NftAuth(_) => "nft_auth",
        }
    }
}

/// Structured query sent to `POST /api/search`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRequest {
    #[serde(alias = "protoai_intent")]
    pub version: String,
    pub action: Action,
    pub scope: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    pub response_format: String,
    pub auth_info: AuthInfo,
}

impl IntentRequest {
    /// The `query` parameter, if any
    pub fn query(&self) -> Option<&str> {
        self.parameters.get(QUERY_PARAM).map(String::as_str)
    }
}
