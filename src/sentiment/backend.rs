use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Upstream sentiment analysis seam
#[async_trait]
pub trait SentimentBackend: Send + Sync {
    /// Analyze review text, returning a polarity distribution
    async fn analyze(&self, text: &str) -> Result<SentimentResponse>;
}

/// Upstream keyword expansion seam
#[async_trait]
pub trait ExpansionBackend: Send + Sync {
    /// Expand one keyword into semantically related keywords
    async fn expand(&self, keyword: &str) -> Result<Vec<String>>;
}

/// Polarity distribution as produced by the sentiment upstream:
/// parallel label/probability vectors over the five polarity classes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResponse {
    pub labels: Vec<String>,
    pub probs: Vec<f64>,
}

impl SentimentResponse {
    /// Collapse the distribution into a single score in [-1, 1]:
    /// probability-weighted sum over per-label polarity weights.
    pub fn polarity_score(&self) -> Result<f64> {
        if self.labels.len() != self.probs.len() || self.labels.is_empty() {
            return Err(AppError::upstream(
                "sentiment",
                "malformed polarity distribution",
            ));
        }

        let mut score = 0.0;
        for (label, prob) in self.labels.iter().zip(&self.probs) {
            let weight = match label.as_str() {
                "very_pos" => 1.0,
                "pos" => 0.5,
                "neu" => 0.0,
                "neg" => -0.5,
                "very_neg" => -1.0,
                other => {
                    return Err(AppError::upstream(
                        "sentiment",
                        format!("unknown polarity label '{}'", other),
                    ))
                }
            };
            score += weight * prob;
        }

        Ok(score.clamp(-1.0, 1.0))
    }
}

/// HTTP implementation of the sentiment upstream
pub struct HttpSentimentBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSentimentBackend {
    /// Create a backend with a bounded per-request timeout
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("sentiment client: {}", e)))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl SentimentBackend for HttpSentimentBackend {
    async fn analyze(&self, text: &str) -> Result<SentimentResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| map_reqwest_error("sentiment", e))?;

        if !response.status().is_success() {
            return Err(AppError::upstream(
                "sentiment",
                format!("status {}", response.status()),
            ));
        }

        response
            .json::<SentimentResponse>()
            .await
            .map_err(|e| map_reqwest_error("sentiment", e))
    }
}

/// HTTP implementation of the expansion upstream
pub struct HttpExpansionBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpExpansionBackend {
    /// Create a backend with a bounded per-request timeout
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("expansion client: {}", e)))?;

        Ok(Self { client, endpoint })
    }
}

#[derive(Debug, Deserialize)]
struct ExpansionResponse {
    keywords: Vec<String>,
}

#[async_trait]
impl ExpansionBackend for HttpExpansionBackend {
    async fn expand(&self, keyword: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "keyword": keyword }))
            .send()
            .await
            .map_err(|e| map_reqwest_error("expansion", e))?;

        if !response.status().is_success() {
            return Err(AppError::upstream(
                "expansion",
                format!("status {}", response.status()),
            ));
        }

        let body = response
            .json::<ExpansionResponse>()
            .await
            .map_err(|e| map_reqwest_error("expansion", e))?;

        Ok(body.keywords)
    }
}

/// Keep timeouts distinct from transport/decode failures in the logs
fn map_reqwest_error(service: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::upstream(service, "request timed out")
    } else if err.is_decode() {
        AppError::upstream(service, format!("malformed response: {}", err))
    } else {
        AppError::upstream(service, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_score_weighting() {
        let response = SentimentResponse {
            labels: vec![
                "very_pos".to_string(),
                "pos".to_string(),
                "neu".to_string(),
                "neg".to_string(),
                "very_neg".to_string(),
            ],
            probs: vec![0.6, 0.4, 0.0, 0.0, 0.0],
        };

        let score = response.polarity_score().unwrap();
        assert!((score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_polarity_score_negative() {
        let response = SentimentResponse {
            labels: vec!["very_neg".to_string()],
            probs: vec![1.0],
        };

        assert_eq!(response.polarity_score().unwrap(), -1.0);
    }

    #[test]
    fn test_polarity_score_rejects_unknown_label() {
        let response = SentimentResponse {
            labels: vec!["meh".to_string()],
            probs: vec![1.0],
        };

        assert!(response.polarity_score().is_err());
    }

    #[test]
    fn test_polarity_score_rejects_mismatched_lengths() {
        let response = SentimentResponse {
            labels: vec!["pos".to_string()],
            probs: vec![0.5, 0.5],
        };

        assert!(response.polarity_score().is_err());
    }
}
