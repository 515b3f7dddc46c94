//! Shared fixtures for integration tests

use review_pulse::aggregation::{NewReview, ReviewAggregator};
use review_pulse::cache::ResultCache;
use review_pulse::config::CacheConfig;
use review_pulse::index::{InMemoryIndex, KeywordIndex};
use review_pulse::models::{Restaurant, ReviewSource};
use review_pulse::sentiment::{KeywordExpander, SentimentBackend, SentimentScorer};
use review_pulse::store::{AggregateStore, InMemoryStore};
use std::sync::Arc;
use std::time::Duration;

pub const KEYWORD_CAP: usize = 12;

pub fn test_restaurant(id: &str) -> Restaurant {
    Restaurant::new(
        id.to_string(),
        format!("Restaurant {}", id),
        "12 Main St".to_string(),
        37.5665,
        126.9780,
    )
}

pub fn test_review(restaurant_id: &str, text: &str) -> NewReview {
    NewReview {
        text: text.to_string(),
        restaurant_id: restaurant_id.to_string(),
        user_id: "user-1".to_string(),
        source: ReviewSource::User,
    }
}

/// Wire an aggregator over in-memory components with no upstreams,
/// returning the handles the tests assert against.
#[allow(dead_code)]
pub fn memory_stack() -> (Arc<InMemoryStore>, Arc<InMemoryIndex>, ResultCache, ReviewAggregator) {
    memory_stack_with_backend(None)
}

#[allow(dead_code)]
pub fn memory_stack_with_backend(
    backend: Option<Arc<dyn SentimentBackend>>,
) -> (Arc<InMemoryStore>, Arc<InMemoryIndex>, ResultCache, ReviewAggregator) {
    let store = Arc::new(InMemoryStore::new());
    let index = Arc::new(InMemoryIndex::new());
    let cache = ResultCache::new(&CacheConfig::default());

    let scorer = Arc::new(SentimentScorer::new(backend, Duration::from_secs(1), 8));
    let expander = Arc::new(KeywordExpander::new(
        None,
        Duration::from_secs(1),
        5,
        Duration::from_secs(60),
        100,
    ));

    let aggregator = ReviewAggregator::new(
        store.clone() as Arc<dyn AggregateStore>,
        index.clone() as Arc<dyn KeywordIndex>,
        cache.clone(),
        scorer,
        expander,
        KEYWORD_CAP,
    );

    (store, index, cache, aggregator)
}
