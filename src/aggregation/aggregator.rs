use crate::cache::ResultCache;
use crate::error::{AppError, Result};
use crate::index::KeywordIndex;
use crate::models::{AggregateSnapshot, Review, ReviewSource};
use crate::sentiment::{Expansion, KeywordExpander, SentimentScorer};
use crate::aggregation::keywords::merge_keywords;
use crate::store::AggregateStore;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

/// Parameters of one inbound review
#[derive(Debug, Clone)]
pub struct NewReview {
    pub text: String,
    pub restaurant_id: String,
    pub user_id: String,
    pub source: ReviewSource,
}

/// A committed review plus the aggregate it produced
#[derive(Debug, Clone)]
pub struct ReviewCreated {
    pub review: Review,
    pub aggregate: AggregateSnapshot,

    /// True when the sentiment score came from the local fallback
    pub degraded: bool,
}

/// Orchestration core: scores inbound reviews, folds them into the
/// per-restaurant aggregate atomically, maintains the keyword index
/// incrementally and invalidates affected cache entries.
///
/// Only the aggregate increment is serialized (at the store). The index
/// and cache updates that follow are eventually consistent; a crash after
/// the increment leaves a correct aggregate with a briefly lagging index.
pub struct ReviewAggregator {
    store: Arc<dyn AggregateStore>,
    index: Arc<dyn KeywordIndex>,
    cache: ResultCache,
    scorer: Arc<SentimentScorer>,
    expander: Arc<KeywordExpander>,
    keyword_cap: usize,
}

impl ReviewAggregator {
    pub fn new(
        store: Arc<dyn AggregateStore>,
        index: Arc<dyn KeywordIndex>,
        cache: ResultCache,
        scorer: Arc<SentimentScorer>,
        expander: Arc<KeywordExpander>,
        keyword_cap: usize,
    ) -> Self {
        Self {
            store,
            index,
            cache,
            scorer,
            expander,
            keyword_cap,
        }
    }

    /// Get a reference to the aggregate store
    pub fn store(&self) -> &Arc<dyn AggregateStore> {
        &self.store
    }

    /// Ingest one review
    pub async fn create_review(&self, request: NewReview) -> Result<ReviewCreated> {
        if request.text.trim().is_empty() {
            return Err(AppError::Validation(
                "review text must not be empty".to_string(),
            ));
        }

        // Existence is checked before any scoring or mutation
        if self
            .store
            .get_restaurant(&request.restaurant_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "Restaurant {} not found",
                request.restaurant_id
            )));
        }

        let scored = self.scorer.score(&request.text).await;

        tracing::info!(
            restaurant_id = %request.restaurant_id,
            score = scored.score,
            keyword_count = scored.keywords.len(),
            degraded = scored.degraded,
            "Review scored"
        );

        // The single serialized step: atomic increment at the store.
        // Nothing before this point has produced a side effect.
        let (review_count, total_score) = self
            .store
            .apply_review(&request.restaurant_id, scored.score)
            .await?;

        let review = Review::new(
            request.restaurant_id.clone(),
            request.user_id,
            request.text,
            request.source,
            scored.score,
            scored.degraded,
        );
        self.store.save_review(&review).await?;

        let keywords = self
            .refresh_keywords(&request.restaurant_id, &scored.keywords)
            .await?;

        tracing::info!(
            review_id = %review.id,
            restaurant_id = %request.restaurant_id,
            review_count,
            "Review committed"
        );

        Ok(ReviewCreated {
            aggregate: AggregateSnapshot::new(
                request.restaurant_id,
                review_count,
                total_score,
                keywords,
            ),
            degraded: scored.degraded,
            review,
        })
    }

    /// Expand one keyword. Pure lookup: no aggregate or index mutation.
    pub async fn expand_keyword(&self, keyword: &str) -> Result<Expansion> {
        self.expander.expand(keyword).await
    }

    /// Recompute a restaurant's keyword set from all of its stored review
    /// texts, re-index and invalidate as for a normal ingestion.
    pub async fn rebuild_keywords(&self, restaurant_id: &str) -> Result<Vec<String>> {
        if self.store.get_restaurant(restaurant_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Restaurant {} not found",
                restaurant_id
            )));
        }

        let reviews = self.store.reviews_for_restaurant(restaurant_id).await?;
        let corpus = reviews
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let candidates = crate::sentiment::lexicon::extract_keywords(&corpus, self.keyword_cap);

        tracing::info!(
            restaurant_id = %restaurant_id,
            review_count = reviews.len(),
            keyword_count = candidates.len(),
            "Rebuilding keyword set from review corpus"
        );

        // Rebuild replaces the set wholesale: start from empty state so
        // stale keywords no longer backed by any review drop out.
        let merged = merge_keywords(Default::default(), &candidates, self.keyword_cap, Utc::now());
        let previous = self.store.set_keywords(restaurant_id, &merged).await?;

        self.reconcile_index(restaurant_id, &previous, &merged.keywords)
            .await;

        Ok(merged.keywords)
    }

    /// Steps 5-7 of ingestion: merge candidates into the persisted keyword
    /// state, diff against the previously persisted set and propagate to
    /// the index and cache.
    async fn refresh_keywords(
        &self,
        restaurant_id: &str,
        candidates: &[String],
    ) -> Result<Vec<String>> {
        let current = self.store.keyword_state(restaurant_id).await?;
        let merged = merge_keywords(current, candidates, self.keyword_cap, Utc::now());
        let previous = self.store.set_keywords(restaurant_id, &merged).await?;

        self.reconcile_index(restaurant_id, &previous, &merged.keywords)
            .await;

        Ok(merged.keywords)
    }

    /// Apply the keyword-set diff to the index and invalidate affected
    /// cache entries. The diff base is the set returned by the store's
    /// atomic swap, never a pre-commit in-memory copy, so a slow writer
    /// cannot reapply a stale delta. Index and cache failures are logged
    /// and absorbed: both structures are eventually consistent.
    async fn reconcile_index(&self, restaurant_id: &str, previous: &[String], next: &[String]) {
        let previous: HashSet<&String> = previous.iter().collect();
        let next: HashSet<&String> = next.iter().collect();
        let mut touched: Vec<&String> = Vec::new();

        for added in next.difference(&previous) {
            if let Err(e) = self.index.add(added, restaurant_id).await {
                tracing::error!(keyword = %added, restaurant_id = %restaurant_id, error = %e, "Keyword index add failed");
            }
            touched.push(added);
        }

        for removed in previous.difference(&next) {
            if let Err(e) = self.index.remove(removed, restaurant_id).await {
                tracing::error!(keyword = %removed, restaurant_id = %restaurant_id, error = %e, "Keyword index remove failed");
            }
            touched.push(removed);
        }

        self.cache.invalidate_tag(restaurant_id).await;
        for keyword in touched {
            self.cache.invalidate_tag(keyword).await;
        }
    }
}
