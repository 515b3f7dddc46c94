use crate::config::ExpansionConfig;
use crate::error::{AppError, Result};
use crate::sentiment::backend::{ExpansionBackend, HttpExpansionBackend};
use dashmap::DashMap;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// A bounded set of related keywords, original included
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub keywords: Vec<String>,

    /// True when served from an expired prior result after upstream failure
    pub stale: bool,

    /// True when the upstream was unavailable and no prior result existed
    pub degraded: bool,
}

/// Maps one keyword to a bounded set of related keywords, caching results
/// per keyword with a TTL. A repeat request within the TTL performs no
/// upstream call and returns byte-identical output.
pub struct KeywordExpander {
    backend: Option<Arc<dyn ExpansionBackend>>,
    cache: Cache<String, Vec<String>>,
    // Last successful expansion per keyword, kept past the TTL so upstream
    // outages can serve a stale result instead of collapsing to a singleton.
    last_known: DashMap<String, Vec<String>>,
    timeout: Duration,
    max_expanded: usize,
}

impl KeywordExpander {
    /// Create an expander over an explicit backend (tests inject mocks here)
    pub fn new(
        backend: Option<Arc<dyn ExpansionBackend>>,
        timeout: Duration,
        max_expanded: usize,
        cache_ttl: Duration,
        cache_capacity: u64,
    ) -> Self {
        let cache = Cache::builder()
            .max_capacity(cache_capacity)
            .time_to_live(cache_ttl)
            .build();

        Self {
            backend,
            cache,
            last_known: DashMap::new(),
            timeout,
            max_expanded,
        }
    }

    /// Build from configuration: HTTP backend when an endpoint is set
    pub fn from_config(config: &ExpansionConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let backend: Option<Arc<dyn ExpansionBackend>> = match &config.endpoint {
            Some(endpoint) => Some(Arc::new(HttpExpansionBackend::new(
                endpoint.clone(),
                timeout,
            )?)),
            None => None,
        };

        Ok(Self::new(
            backend,
            timeout,
            config.max_expanded,
            Duration::from_secs(config.cache_ttl_secs),
            config.cache_capacity,
        ))
    }

    /// Expand one keyword. Upstream failure degrades, never errors:
    /// a stale prior result wins over the singleton fallback.
    pub async fn expand(&self, keyword: &str) -> Result<Expansion> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return Err(AppError::Validation("keyword must not be empty".to_string()));
        }

        if let Some(cached) = self.cache.get(&keyword).await {
            tracing::debug!(keyword = %keyword, "Expansion cache hit");
            return Ok(Expansion {
                keywords: cached,
                stale: false,
                degraded: false,
            });
        }

        let Some(backend) = &self.backend else {
            let keywords = vec![keyword.clone()];
            self.cache.insert(keyword, keywords.clone()).await;
            return Ok(Expansion {
                keywords,
                stale: false,
                degraded: false,
            });
        };

        let upstream = tokio::time::timeout(self.timeout, backend.expand(&keyword)).await;

        match upstream {
            Ok(Ok(related)) => {
                let keywords = self.normalize(&keyword, related);
                self.cache.insert(keyword.clone(), keywords.clone()).await;
                self.last_known.insert(keyword, keywords.clone());
                Ok(Expansion {
                    keywords,
                    stale: false,
                    degraded: false,
                })
            }
            Ok(Err(e)) => {
                tracing::warn!(keyword = %keyword, error = %e, "Expansion upstream failed");
                Ok(self.fallback(keyword))
            }
            Err(_) => {
                tracing::warn!(
                    keyword = %keyword,
                    timeout_secs = self.timeout.as_secs(),
                    "Expansion upstream timed out"
                );
                Ok(self.fallback(keyword))
            }
        }
    }

    /// Dedup, keep the original first, cap at the configured maximum
    fn normalize(&self, keyword: &str, related: Vec<String>) -> Vec<String> {
        let mut keywords = vec![keyword.to_string()];
        for candidate in related {
            if keywords.len() >= self.max_expanded {
                break;
            }
            let candidate = candidate.trim().to_lowercase();
            if candidate.is_empty() || keywords.contains(&candidate) {
                continue;
            }
            keywords.push(candidate);
        }
        keywords
    }

    /// Stale prior result if one exists, singleton otherwise. The fallback
    /// is not cached: the next request retries the upstream.
    fn fallback(&self, keyword: String) -> Expansion {
        if let Some(prior) = self.last_known.get(&keyword) {
            return Expansion {
                keywords: prior.clone(),
                stale: true,
                degraded: false,
            };
        }

        Expansion {
            keywords: vec![keyword],
            stale: false,
            degraded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct CountingBackend {
        calls: AtomicUsize,
        related: Vec<String>,
    }

    #[async_trait]
    impl ExpansionBackend for CountingBackend {
        async fn expand(&self, _keyword: &str) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.related.clone())
        }
    }

    struct FlakyBackend {
        fail: AtomicBool,
        related: Vec<String>,
    }

    #[async_trait]
    impl ExpansionBackend for FlakyBackend {
        async fn expand(&self, _keyword: &str) -> Result<Vec<String>> {
            if self.fail.load(Ordering::SeqCst) {
                Err(AppError::upstream("expansion", "connection refused"))
            } else {
                Ok(self.related.clone())
            }
        }
    }

    fn expander_over(backend: Arc<dyn ExpansionBackend>) -> KeywordExpander {
        KeywordExpander::new(
            Some(backend),
            Duration::from_secs(1),
            5,
            Duration::from_secs(60),
            100,
        )
    }

    #[tokio::test]
    async fn test_repeat_within_ttl_hits_cache() {
        let backend = Arc::new(CountingBackend {
            calls: AtomicUsize::new(0),
            related: vec!["hot".to_string(), "fiery".to_string()],
        });
        let expander = expander_over(backend.clone());

        let first = expander.expand("spicy").await.unwrap();
        let second = expander.expand("spicy").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.keywords[0], "spicy");
        assert!(first.keywords.len() <= 5);
    }

    #[tokio::test]
    async fn test_expansion_dedup_and_cap() {
        let backend = Arc::new(CountingBackend {
            calls: AtomicUsize::new(0),
            related: vec![
                "hot".to_string(),
                "Spicy".to_string(),
                "fiery".to_string(),
                "hot".to_string(),
                "peppery".to_string(),
                "smoky".to_string(),
                "tangy".to_string(),
            ],
        });
        let expander = expander_over(backend);

        let expansion = expander.expand("spicy").await.unwrap();

        assert_eq!(
            expansion.keywords,
            vec!["spicy", "hot", "fiery", "peppery", "smoky"]
        );
    }

    #[tokio::test]
    async fn test_cap_of_one_keeps_only_the_original() {
        let backend = Arc::new(CountingBackend {
            calls: AtomicUsize::new(0),
            related: vec![
                "hot".to_string(),
                "fiery".to_string(),
                "peppery".to_string(),
                "smoky".to_string(),
            ],
        });
        let expander = KeywordExpander::new(
            Some(backend),
            Duration::from_secs(1),
            1,
            Duration::from_secs(60),
            100,
        );

        let expansion = expander.expand("spicy").await.unwrap();

        assert_eq!(expansion.keywords, vec!["spicy"]);
    }

    #[tokio::test]
    async fn test_failure_without_prior_is_degraded_singleton() {
        let backend = Arc::new(FlakyBackend {
            fail: AtomicBool::new(true),
            related: vec![],
        });
        let expander = expander_over(backend);

        let expansion = expander.expand("spicy").await.unwrap();

        assert!(expansion.degraded);
        assert!(!expansion.stale);
        assert_eq!(expansion.keywords, vec!["spicy".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_with_prior_serves_stale() {
        let backend = Arc::new(FlakyBackend {
            fail: AtomicBool::new(false),
            related: vec!["hot".to_string()],
        });
        // Zero TTL so the fresh cache entry expires immediately and only
        // the last-known copy survives.
        let expander = KeywordExpander::new(
            Some(backend.clone()),
            Duration::from_secs(1),
            5,
            Duration::from_millis(1),
            100,
        );

        let fresh = expander.expand("spicy").await.unwrap();
        assert!(!fresh.stale);

        tokio::time::sleep(Duration::from_millis(20)).await;
        backend.fail.store(true, Ordering::SeqCst);

        let stale = expander.expand("spicy").await.unwrap();
        assert!(stale.stale);
        assert_eq!(stale.keywords, fresh.keywords);
    }

    #[tokio::test]
    async fn test_empty_keyword_rejected() {
        let expander = KeywordExpander::new(
            None,
            Duration::from_secs(1),
            5,
            Duration::from_secs(60),
            100,
        );

        assert!(expander.expand("   ").await.is_err());
    }
}
