mod common;

use common::{memory_stack, test_restaurant, test_review};
use review_pulse::cache::ResultCache;
use review_pulse::search::{MatchMode, SearchQuery, SearchResolver};
use review_pulse::store::AggregateStore;

fn query(keywords: &[&str], mode: MatchMode) -> SearchQuery {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_string()).collect();
    SearchQuery::new(&keywords, mode, None).unwrap()
}

#[tokio::test]
async fn test_search_finds_ingested_keywords() {
    let (store, index, cache, aggregator) = memory_stack();
    store.insert_restaurant(&test_restaurant("r1")).await.unwrap();
    store.insert_restaurant(&test_restaurant("r2")).await.unwrap();

    aggregator
        .create_review(test_review("r1", "amazing spicy noodles"))
        .await
        .unwrap();
    aggregator
        .create_review(test_review("r2", "terrible bland noodles"))
        .await
        .unwrap();

    let resolver = SearchResolver::new(store, index, cache);

    let results = resolver
        .search(&query(&["spicy"], MatchMode::All))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "r1");

    let results = resolver
        .search(&query(&["noodles"], MatchMode::All))
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    // Positive review sorts above negative
    assert_eq!(results[0].id, "r1");
}

#[tokio::test]
async fn test_ingestion_invalidates_cached_results() {
    let (store, index, cache, aggregator) = memory_stack();
    store.insert_restaurant(&test_restaurant("r1")).await.unwrap();
    store.insert_restaurant(&test_restaurant("r2")).await.unwrap();

    aggregator
        .create_review(test_review("r1", "great spicy stew"))
        .await
        .unwrap();

    let resolver = SearchResolver::new(store, index, cache);
    let q = query(&["spicy"], MatchMode::All);

    let before = resolver.search(&q).await.unwrap();
    assert_eq!(before.len(), 1);

    // A new restaurant picks up the same keyword: the cached entry is
    // tagged with "spicy" and must be dropped, not served stale.
    aggregator
        .create_review(test_review("r2", "spicy pork belly"))
        .await
        .unwrap();

    let after = resolver.search(&q).await.unwrap();
    assert_eq!(after.len(), 2);
}

#[tokio::test]
async fn test_cache_disabled_gives_identical_results() {
    let (store, index, cache, aggregator) = memory_stack();
    store.insert_restaurant(&test_restaurant("r1")).await.unwrap();
    store.insert_restaurant(&test_restaurant("r2")).await.unwrap();

    aggregator
        .create_review(test_review("r1", "great spicy noodles"))
        .await
        .unwrap();
    aggregator
        .create_review(test_review("r2", "decent spicy rice"))
        .await
        .unwrap();

    let cached = SearchResolver::new(store.clone(), index.clone(), cache);
    let uncached = SearchResolver::new(store, index, ResultCache::disabled());

    let q = query(&["spicy"], MatchMode::All);
    let from_cached = cached.search(&q).await.unwrap();
    let from_uncached = uncached.search(&q).await.unwrap();

    assert_eq!(from_cached, from_uncached);
    assert_eq!(from_cached.len(), 2);

    // Repeat against the disabled cache stays correct
    assert_eq!(uncached.search(&q).await.unwrap(), from_uncached);
}

#[tokio::test]
async fn test_match_any_unions_across_keywords() {
    let (store, index, cache, aggregator) = memory_stack();
    store.insert_restaurant(&test_restaurant("r1")).await.unwrap();
    store.insert_restaurant(&test_restaurant("r2")).await.unwrap();

    aggregator
        .create_review(test_review("r1", "wonderful spicy stew"))
        .await
        .unwrap();
    aggregator
        .create_review(test_review("r2", "wonderful noodles"))
        .await
        .unwrap();

    let resolver = SearchResolver::new(store, index, cache);

    let none = resolver
        .search(&query(&["spicy", "noodles"], MatchMode::All))
        .await
        .unwrap();
    assert!(none.is_empty());

    let both = resolver
        .search(&query(&["spicy", "noodles"], MatchMode::Any))
        .await
        .unwrap();
    assert_eq!(both.len(), 2);
}

#[tokio::test]
async fn test_search_never_mutates_aggregate() {
    let (store, index, cache, aggregator) = memory_stack();
    store.insert_restaurant(&test_restaurant("r1")).await.unwrap();

    aggregator
        .create_review(test_review("r1", "fantastic spicy ramen"))
        .await
        .unwrap();

    let before = store.get_restaurant("r1").await.unwrap().unwrap();

    let resolver = SearchResolver::new(store.clone(), index, cache);
    for _ in 0..3 {
        resolver
            .search(&query(&["spicy"], MatchMode::All))
            .await
            .unwrap();
    }

    let after = store.get_restaurant("r1").await.unwrap().unwrap();
    assert_eq!(before.review_count, after.review_count);
    assert_eq!(before.total_score, after.total_score);
    assert_eq!(before.keywords, after.keywords);
}

#[tokio::test]
async fn test_equivalent_queries_share_one_cache_entry() {
    let (store, index, cache, aggregator) = memory_stack();
    store.insert_restaurant(&test_restaurant("r1")).await.unwrap();

    aggregator
        .create_review(test_review("r1", "great spicy noodles"))
        .await
        .unwrap();

    let resolver = SearchResolver::new(store, index, cache.clone());

    let a = SearchQuery::new(
        &["Spicy".to_string(), "noodles".to_string()],
        MatchMode::All,
        None,
    )
    .unwrap();
    let b = SearchQuery::new(
        &["noodles".to_string(), " spicy ".to_string()],
        MatchMode::All,
        None,
    )
    .unwrap();

    resolver.search(&a).await.unwrap();
    resolver.search(&b).await.unwrap();

    assert_eq!(a.fingerprint(), b.fingerprint());
    cache.run_pending_tasks().await;
    assert_eq!(cache.entry_count(), 1);
}
