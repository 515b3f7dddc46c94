use crate::cache::ResultCache;
use crate::error::Result;
use crate::index::KeywordIndex;
use crate::models::RestaurantSummary;
use crate::search::query::{MatchMode, SearchQuery};
use crate::store::AggregateStore;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

/// Answers keyword queries: cache first, then index plus store on a miss.
/// Strictly read-only against the aggregate.
pub struct SearchResolver {
    store: Arc<dyn AggregateStore>,
    index: Arc<dyn KeywordIndex>,
    cache: ResultCache,
}

impl SearchResolver {
    pub fn new(
        store: Arc<dyn AggregateStore>,
        index: Arc<dyn KeywordIndex>,
        cache: ResultCache,
    ) -> Self {
        Self {
            store,
            index,
            cache,
        }
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<RestaurantSummary>> {
        let fingerprint = query.fingerprint();

        if let Some(cached) = self.cache.get(&fingerprint).await {
            tracing::debug!(fingerprint = %fingerprint, results = cached.len(), "Search cache hit");
            return Ok(cached);
        }

        let ids = self.resolve_ids(query).await?;
        let mut ids: Vec<String> = ids.into_iter().collect();
        ids.sort();

        let restaurants = self.store.get_restaurants(&ids).await?;
        let mut summaries: Vec<RestaurantSummary> =
            restaurants.iter().map(|r| r.summary()).collect();

        summaries.sort_by(compare_summaries);
        summaries.truncate(query.limit());

        // Tag with every matched restaurant and every queried keyword so
        // both ingestion and keyword churn can invalidate this entry.
        let tags: Vec<String> = summaries
            .iter()
            .map(|s| s.id.clone())
            .chain(query.keywords().iter().cloned())
            .collect();
        self.cache
            .put(&fingerprint, summaries.clone(), &tags)
            .await;

        tracing::debug!(
            fingerprint = %fingerprint,
            keywords = ?query.keywords(),
            results = summaries.len(),
            "Search resolved from index"
        );

        Ok(summaries)
    }

    async fn resolve_ids(&self, query: &SearchQuery) -> Result<HashSet<String>> {
        let mut combined: Option<HashSet<String>> = None;

        for keyword in query.keywords() {
            let ids = self.index.query(keyword).await?;

            combined = Some(match (combined, query.mode()) {
                (None, _) => ids,
                (Some(acc), MatchMode::All) => acc.intersection(&ids).cloned().collect(),
                (Some(mut acc), MatchMode::Any) => {
                    acc.extend(ids);
                    acc
                }
            });

            // Intersection can only shrink
            if query.mode() == MatchMode::All
                && combined.as_ref().map(HashSet::is_empty).unwrap_or(false)
            {
                break;
            }
        }

        Ok(combined.unwrap_or_default())
    }
}

/// Average score descending with no-review restaurants last, then
/// review_count descending, then id for a stable order.
fn compare_summaries(a: &RestaurantSummary, b: &RestaurantSummary) -> Ordering {
    match (a.average_score, b.average_score) {
        (Some(x), Some(y)) => y
            .partial_cmp(&x)
            .unwrap_or(Ordering::Equal)
            .then(b.review_count.cmp(&a.review_count))
            .then(a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.review_count.cmp(&a.review_count).then(a.id.cmp(&b.id)),
    }
}
