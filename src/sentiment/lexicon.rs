//! Local fallback heuristics: lexicon-based polarity scoring and
//! stopword-filtered frequency keyword extraction. Used when the
//! sentiment upstream is unreachable or not configured.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

static POSITIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "amazing",
        "awesome",
        "best",
        "clean",
        "cozy",
        "crisp",
        "delicious",
        "enjoy",
        "enjoyed",
        "excellent",
        "fantastic",
        "fast",
        "fresh",
        "friendly",
        "generous",
        "good",
        "great",
        "juicy",
        "kind",
        "love",
        "loved",
        "lovely",
        "perfect",
        "recommend",
        "rich",
        "savory",
        "tasty",
        "tender",
        "warm",
        "wonderful",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "awful",
        "bad",
        "bland",
        "burnt",
        "cramped",
        "dirty",
        "disappointed",
        "disappointing",
        "dry",
        "greasy",
        "hate",
        "hated",
        "mediocre",
        "noisy",
        "overpriced",
        "rude",
        "slow",
        "smelly",
        "soggy",
        "stale",
        "terrible",
        "tough",
        "worst",
    ]
    .into_iter()
    .collect()
});

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "after", "again", "all", "an", "and", "any", "are", "as", "at", "be",
        "because", "been", "before", "being", "both", "but", "by", "can", "did", "do", "does",
        "each", "few", "for", "from", "had", "has", "have", "he", "her", "here", "him", "his",
        "how", "i", "if", "in", "into", "is", "it", "its", "just", "me", "more", "most", "my",
        "no", "nor", "not", "of", "off", "on", "once", "only", "or", "other", "our", "out",
        "over", "own", "same", "she", "so", "some", "such", "than", "that", "the", "their",
        "them", "then", "there", "these", "they", "this", "those", "through", "to", "too",
        "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
        "while", "who", "whom", "why", "will", "with", "you", "your",
    ]
    .into_iter()
    .collect()
});

/// Lowercased alphanumeric tokens of the input text
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Lexicon polarity score in [-1, 1]: net positive hit ratio over all
/// polarity hits. Texts with no polarity hits score neutral.
pub fn polarity_score(text: &str) -> f64 {
    let mut positive = 0i64;
    let mut negative = 0i64;

    for token in tokenize(text) {
        if POSITIVE.contains(token.as_str()) {
            positive += 1;
        } else if NEGATIVE.contains(token.as_str()) {
            negative += 1;
        }
    }

    let hits = positive + negative;
    if hits == 0 {
        0.0
    } else {
        (positive - negative) as f64 / hits as f64
    }
}

/// Candidate keywords ranked by frequency against a stopword-filtered
/// vocabulary: ties keep first-occurrence order. Single-character tokens
/// carry no descriptive weight and are dropped.
pub fn extract_keywords(text: &str, max: usize) -> Vec<String> {
    let mut frequency: HashMap<String, u64> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for token in tokenize(text) {
        if token.chars().count() < 2 || STOPWORDS.contains(token.as_str()) {
            continue;
        }
        if !frequency.contains_key(&token) {
            first_seen.push(token.clone());
        }
        *frequency.entry(token).or_insert(0) += 1;
    }

    let mut ranked: Vec<(usize, String)> = first_seen.into_iter().enumerate().collect();
    ranked.sort_by(|(pos_a, a), (pos_b, b)| {
        frequency[b]
            .cmp(&frequency[a])
            .then_with(|| pos_a.cmp(pos_b))
    });

    ranked
        .into_iter()
        .map(|(_, keyword)| keyword)
        .take(max)
        .collect()
}
