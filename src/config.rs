use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Aggregate store backend configuration
    pub store: StoreConfig,

    /// Sentiment scoring configuration
    pub sentiment: SentimentConfig,

    /// Keyword expansion configuration
    pub expansion: ExpansionConfig,

    /// Review aggregation configuration
    pub aggregation: AggregationConfig,

    /// Result cache configuration
    pub cache: CacheConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from embedded defaults, optional file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with embedded default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: REVIEW_PULSE)
            .add_source(
                config::Environment::with_prefix("REVIEW_PULSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            sentiment: SentimentConfig::default(),
            expansion: ExpansionConfig::default(),
            aggregation: AggregationConfig::default(),
            cache: CacheConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend type
    #[serde(default)]
    pub backend: StoreBackend,

    /// Redis connection string
    pub redis_url: Option<String>,

    /// Key prefix for the Redis backend
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Per-operation timeout for the Redis backend (seconds)
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            redis_url: None,
            key_prefix: default_key_prefix(),
            timeout_secs: default_store_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// Sentiment analysis upstream endpoint. None runs lexicon-only scoring.
    pub endpoint: Option<String>,

    /// Upstream call timeout (seconds)
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,

    /// Maximum candidate keywords extracted per review
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_upstream_timeout(),
            max_keywords: default_max_keywords(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Keyword expansion upstream endpoint. None degrades to singleton sets.
    pub endpoint: Option<String>,

    /// Upstream call timeout (seconds)
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,

    /// Maximum size of an expanded keyword set, original included
    #[serde(default = "default_max_expanded")]
    pub max_expanded: usize,

    /// Expansion cache TTL (seconds)
    #[serde(default = "default_expansion_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Expansion cache capacity (entries)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_upstream_timeout(),
            max_expanded: default_max_expanded(),
            cache_ttl_secs: default_expansion_cache_ttl(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Maximum keywords retained per restaurant
    #[serde(default = "default_keyword_cap")]
    pub keyword_cap: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            keyword_cap: default_keyword_cap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable the result cache. Disabled degrades to pass-through.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Result cache entry TTL (seconds)
    #[serde(default = "default_result_cache_ttl")]
    pub ttl_secs: u64,

    /// Result cache capacity (entries)
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_result_cache_ttl(),
            capacity: default_cache_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_key_prefix() -> String {
    "review-pulse".to_string()
}

fn default_upstream_timeout() -> u64 {
    3
}

fn default_max_keywords() -> usize {
    8
}

fn default_max_expanded() -> usize {
    5
}

fn default_expansion_cache_ttl() -> u64 {
    3600
}

fn default_result_cache_ttl() -> u64 {
    3600
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_keyword_cap() -> usize {
    12
}

fn default_store_timeout() -> u64 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.expansion.max_expanded, 5);
        assert_eq!(config.aggregation.keyword_cap, 12);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_default_store_backend() {
        assert_eq!(StoreBackend::default(), StoreBackend::Memory);
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.sentiment.timeout_secs, 3);
    }
}
