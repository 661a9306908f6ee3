//! Heuristic filter extraction from free-text queries

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Project types and the keywords that select them, checked in order
const TYPE_KEYWORDS: &[(&str, &[&str])] = &[
    ("web", &["web", "website", "site"]),
    ("mobile", &["mobile", "app", "android", "ios"]),
    ("jogo", &["jogo", "game", "gaming"]),
];

const FEATURED_KEYWORDS: &[&str] = &["destaque", "featured"];

static LEVEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:nível|nivel|level)\s*(\d+)").unwrap());

/// Extract structured filters (`tipo`, `level`, `only_featured`) from a query.
///
/// Matching is case-insensitive substring matching; the first project type
/// whose keyword appears wins.
pub fn extract_filters(query: &str) -> BTreeMap<String, String> {
    let mut filters = BTreeMap::new();
    let lower = query.to_lowercase();

    if let Some((kind, _)) = TYPE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
    {
        filters.insert("tipo".to_string(), (*kind).to_string());
    }

    if let Some(level) = LEVEL_RE
        .captures(&lower)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
    {
        filters.insert("level".to_string(), level.to_string());
    }

    if FEATURED_KEYWORDS.iter().any(|k| lower.contains(k)) {
        filters.insert("only_featured".to_string(), "true".to_string());
    }

    filters
}
