//! Client configuration from the environment

use crate::protocol::{AuthInfo, IntentTemplate, NftAuth, DEFAULT_SCOPE, PROTOCOL_VERSION};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for the chat client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub backend_url: String,
    pub auth: AuthInfo,
    pub scope: String,
    pub protocol_version: String,
    pub timeout: Duration,
    /// Enrich search parameters with filters parsed from the query
    pub extract_filters: bool,
    pub cache_enabled: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            auth: AuthInfo::token(""),
            scope: DEFAULT_SCOPE.to_string(),
            protocol_version: PROTOCOL_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            extract_filters: false,
            cache_enabled: true,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let nft = match (
            get("PEUP_NFT_CONTRACT"),
            get("PEUP_NFT_TOKEN_ID"),
            get("PEUP_NFT_WALLET"),
        ) {
            (Some(contract_address), Some(token_id), Some(wallet_address)) => Some(NftAuth {
                contract_address,
                token_id,
                wallet_address,
            }),
            (None, None, None) => None,
            _ => {
                tracing::warn!("Incomplete NFT credentials, falling back to token auth");
                None
            }
        };
        let auth = nft.map_or_else(
            || AuthInfo::token(get("PEUP_AUTH_TOKEN").unwrap_or_default()),
            AuthInfo::NftAuth,
        );

        Self {
            backend_url: get("PEUP_BACKEND_URL").unwrap_or(defaults.backend_url),
            auth,
            scope: get("PEUP_SCOPE").unwrap_or(defaults.scope),
            protocol_version: get("PEUP_PROTOCOL_VERSION").unwrap_or(defaults.protocol_version),
            timeout: Duration::from_secs(parse_or(
                "PEUP_TIMEOUT_SECS",
                get("PEUP_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )),
            extract_filters: parse_flag(
                "PEUP_EXTRACT_FILTERS",
                get("PEUP_EXTRACT_FILTERS"),
                defaults.extract_filters,
            ),
            cache_enabled: parse_flag("PEUP_CACHE", get("PEUP_CACHE"), defaults.cache_enabled),
        }
    }

    /// Envelope every search of a conversation is built from
    pub fn template(&self) -> IntentTemplate {
        IntentTemplate::new(self.auth.clone())
            .with_version(self.protocol_version.clone())
            .with_scope(self.scope.clone())
            .with_filter_extraction(self.extract_filters)
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Unparseable setting, using default");
            default
        }),
    }
}

fn parse_flag(key: &str, raw: Option<String>, default: bool) -> bool {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => default,
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        Some(v) => {
            tracing::warn!(key, value = %v, "Unparseable flag, using default");
            default
        }
    }
}
