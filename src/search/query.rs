use crate::cache::query_fingerprint;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;
pub const MAX_QUERY_KEYWORDS: usize = 10;

/// How id sets from multiple keywords combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Intersection: a restaurant must carry every keyword
    #[default]
    All,
    /// Union: any keyword qualifies
    Any,
}

impl MatchMode {
    fn as_str(&self) -> &'static str {
        match self {
            MatchMode::All => "all",
            MatchMode::Any => "any",
        }
    }
}

/// A normalized search request. Construct via [`SearchQuery::new`] so
/// equivalent raw queries produce equal fingerprints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    keywords: Vec<String>,
    mode: MatchMode,
    limit: usize,
}

impl SearchQuery {
    /// Normalize and validate raw query parts: keywords are trimmed,
    /// lowercased, deduped and sorted; limit is clamped to [1, MAX_LIMIT].
    pub fn new(keywords: &[String], mode: MatchMode, limit: Option<usize>) -> Result<Self> {
        let mut normalized: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        normalized.sort();
        normalized.dedup();

        if normalized.is_empty() {
            return Err(AppError::Validation(
                "search requires at least one keyword".to_string(),
            ));
        }
        if normalized.len() > MAX_QUERY_KEYWORDS {
            return Err(AppError::Validation(format!(
                "search accepts at most {} keywords",
                MAX_QUERY_KEYWORDS
            )));
        }

        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        Ok(Self {
            keywords: normalized,
            mode,
            limit,
        })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Cache key for this query. Equal for equivalent raw inputs because
    /// it hashes the normalized form.
    pub fn fingerprint(&self) -> String {
        let limit = self.limit.to_string();
        let parts = self
            .keywords
            .iter()
            .map(String::as_str)
            .chain([self.mode.as_str(), limit.as_str()]);
        query_fingerprint(parts)
    }
}
