pub mod backend;
pub mod expander;
pub mod lexicon;
pub mod scorer;

pub use backend::{
    ExpansionBackend, HttpExpansionBackend, HttpSentimentBackend, SentimentBackend,
    SentimentResponse,
};
pub use expander::{Expansion, KeywordExpander};
pub use scorer::{ScoredText, SentimentScorer};
