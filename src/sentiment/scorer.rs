use crate::config::SentimentConfig;
use crate::error::Result;
use crate::sentiment::backend::{HttpSentimentBackend, SentimentBackend};
use crate::sentiment::lexicon;
use std::sync::Arc;
use std::time::Duration;

/// Sentiment score plus candidate keywords derived from one review text
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredText {
    /// Sentiment score in [-1, 1]
    pub score: f64,

    /// Candidate keywords ranked by relevance
    pub keywords: Vec<String>,

    /// True when the score came from the local fallback heuristic
    pub degraded: bool,
}

/// Maps review text to a sentiment score and candidate keywords.
/// Pure apart from the optional upstream call; upstream failure falls
/// back to the local lexicon and never fails ingestion.
pub struct SentimentScorer {
    backend: Option<Arc<dyn SentimentBackend>>,
    timeout: Duration,
    max_keywords: usize,
}

impl SentimentScorer {
    /// Create a scorer over an explicit backend (tests inject mocks here)
    pub fn new(
        backend: Option<Arc<dyn SentimentBackend>>,
        timeout: Duration,
        max_keywords: usize,
    ) -> Self {
        Self {
            backend,
            timeout,
            max_keywords,
        }
    }

    /// Build from configuration: HTTP backend when an endpoint is set,
    /// lexicon-only otherwise
    pub fn from_config(config: &SentimentConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let backend: Option<Arc<dyn SentimentBackend>> = match &config.endpoint {
            Some(endpoint) => Some(Arc::new(HttpSentimentBackend::new(
                endpoint.clone(),
                timeout,
            )?)),
            None => None,
        };

        Ok(Self::new(backend, timeout, config.max_keywords))
    }

    /// Score one review text. Keywords are always extracted locally;
    /// the score prefers the upstream and falls back to the lexicon.
    pub async fn score(&self, text: &str) -> ScoredText {
        let keywords = lexicon::extract_keywords(text, self.max_keywords);

        let Some(backend) = &self.backend else {
            return ScoredText {
                score: lexicon::polarity_score(text),
                keywords,
                degraded: false,
            };
        };

        let upstream = tokio::time::timeout(self.timeout, backend.analyze(text)).await;

        match upstream {
            Ok(Ok(response)) => match response.polarity_score() {
                Ok(score) => ScoredText {
                    score,
                    keywords,
                    degraded: false,
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Sentiment upstream returned unusable payload, using lexicon fallback");
                    ScoredText {
                        score: lexicon::polarity_score(text),
                        keywords,
                        degraded: true,
                    }
                }
            },
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Sentiment upstream failed, using lexicon fallback");
                ScoredText {
                    score: lexicon::polarity_score(text),
                    keywords,
                    degraded: true,
                }
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "Sentiment upstream timed out, using lexicon fallback"
                );
                ScoredText {
                    score: lexicon::polarity_score(text),
                    keywords,
                    degraded: true,
                }
            }
        }
    }
}
