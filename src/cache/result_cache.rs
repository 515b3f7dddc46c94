use crate::config::CacheConfig;
use crate::models::RestaurantSummary;
use moka::future::Cache;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Read-through/write-through cache of search results keyed by query
/// fingerprint, with a tag → fingerprint secondary index for bulk
/// invalidation by restaurant id or keyword.
///
/// The tag index is itself a TTL cache. Every `put` re-inserts the tag
/// entry, resetting its TTL, so a tag always outlives its newest member
/// fingerprint; once a tag goes untouched for the payload TTL every
/// fingerprint it held has expired and the whole set is dropped. Expired
/// fingerprints inside a live set invalidate as no-ops.
///
/// Entries are advisory: when disabled (or the backend is lost) every get
/// is a miss and every put/invalidate a logged no-op, never a failure.
#[derive(Clone)]
pub struct ResultCache {
    entries: Cache<String, Vec<RestaurantSummary>>,
    tags: Cache<String, Arc<HashSet<String>>>,
    enabled: bool,
}

impl ResultCache {
    pub fn new(config: &CacheConfig) -> Self {
        let ttl = Duration::from_secs(config.ttl_secs);
        let entries = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_live(ttl)
            .build();

        // Tag sets are far smaller than payloads; the wider capacity keeps
        // size pressure from evicting a tag before its member entries
        let tags = Cache::builder()
            .max_capacity(config.capacity.saturating_mul(8))
            .time_to_live(ttl)
            .build();

        Self {
            entries,
            tags,
            enabled: config.enabled,
        }
    }

    /// A cache that treats every get as a miss and every write as a no-op
    pub fn disabled() -> Self {
        Self::new(&CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn get(&self, fingerprint: &str) -> Option<Vec<RestaurantSummary>> {
        if !self.enabled {
            return None;
        }
        self.entries.get(fingerprint).await
    }

    /// Cache a result under its fingerprint and register it with every tag
    pub async fn put(&self, fingerprint: &str, results: Vec<RestaurantSummary>, tags: &[String]) {
        if !self.enabled {
            tracing::warn!(fingerprint = %fingerprint, "Result cache disabled, skipping put");
            return;
        }

        for tag in tags {
            let fingerprint = fingerprint.to_string();
            self.tags
                .entry(tag.clone())
                .and_upsert_with(|current| {
                    let mut set = current
                        .map(|entry| HashSet::clone(&entry.into_value()))
                        .unwrap_or_default();
                    set.insert(fingerprint);
                    std::future::ready(Arc::new(set))
                })
                .await;
        }
        self.entries.insert(fingerprint.to_string(), results).await;
    }

    pub async fn invalidate(&self, fingerprint: &str) {
        if !self.enabled {
            return;
        }
        self.entries.invalidate(fingerprint).await;
    }

    /// Drop every fingerprint registered under a tag. Fingerprints already
    /// expired by TTL invalidate as no-ops.
    pub async fn invalidate_tag(&self, tag: &str) {
        if !self.enabled {
            return;
        }

        let Some(fingerprints) = self.tags.remove(tag).await else {
            return;
        };

        tracing::debug!(tag = %tag, count = fingerprints.len(), "Invalidating cache entries by tag");
        for fingerprint in fingerprints.iter() {
            self.entries.invalidate(fingerprint).await;
        }
    }

    /// Entry count is eventually consistent in the underlying cache;
    /// flush with [`ResultCache::run_pending_tasks`] before asserting on it.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
        self.tags.run_pending_tasks().await;
    }
}
