use crate::models::{KeywordState, KeywordStat};
use chrono::{DateTime, Utc};

/// Merge candidate keywords from one review into a restaurant's current
/// keyword state. Takes the union, refreshes recency/frequency stats for
/// every contributing candidate, then evicts past the cap by oldest last
/// contribution, ties broken by lowest cross-review frequency. Candidates
/// from the current review always survive over unrefreshed incumbents.
pub fn merge_keywords(
    mut current: KeywordState,
    candidates: &[String],
    cap: usize,
    now: DateTime<Utc>,
) -> KeywordState {
    for candidate in candidates {
        let candidate = candidate.trim().to_lowercase();
        if candidate.is_empty() {
            continue;
        }

        match current.stats.get_mut(&candidate) {
            Some(stat) => {
                stat.last_seen = now;
                stat.frequency += 1;
            }
            None => {
                current.stats.insert(
                    candidate.clone(),
                    KeywordStat {
                        last_seen: now,
                        frequency: 1,
                    },
                );
                current.keywords.push(candidate);
            }
        }
    }

    while current.keywords.len() > cap {
        let Some(victim) = current
            .keywords
            .iter()
            .min_by(|a, b| {
                let stat_a = &current.stats[*a];
                let stat_b = &current.stats[*b];
                stat_a
                    .last_seen
                    .cmp(&stat_b.last_seen)
                    .then_with(|| stat_a.frequency.cmp(&stat_b.frequency))
            })
            .cloned()
        else {
            break;
        };

        current.keywords.retain(|k| k != &victim);
        current.stats.remove(&victim);
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashMap;

    fn state_with(keywords: &[(&str, i64, u64)], now: DateTime<Utc>) -> KeywordState {
        let mut state = KeywordState::default();
        for (keyword, age_secs, frequency) in keywords {
            state.keywords.push(keyword.to_string());
            state.stats.insert(
                keyword.to_string(),
                KeywordStat {
                    last_seen: now - Duration::seconds(*age_secs),
                    frequency: *frequency,
                },
            );
        }
        state
    }

    #[test]
    fn test_union_adds_new_keywords() {
        let now = Utc::now();
        let state = state_with(&[("spicy", 100, 2)], now);

        let merged = merge_keywords(state, &["noodles".to_string()], 10, now);

        assert_eq!(merged.keywords, vec!["spicy", "noodles"]);
        assert_eq!(merged.stats["noodles"].frequency, 1);
        assert_eq!(merged.stats["noodles"].last_seen, now);
    }

    #[test]
    fn test_repeat_candidate_refreshes_stats() {
        let now = Utc::now();
        let state = state_with(&[("spicy", 100, 2)], now);

        let merged = merge_keywords(state, &["spicy".to_string()], 10, now);

        assert_eq!(merged.keywords, vec!["spicy"]);
        assert_eq!(merged.stats["spicy"].frequency, 3);
        assert_eq!(merged.stats["spicy"].last_seen, now);
    }

    #[test]
    fn test_eviction_prefers_oldest() {
        let now = Utc::now();
        let state = state_with(&[("old", 500, 9), ("recent", 10, 1)], now);

        let merged = merge_keywords(state, &["fresh".to_string()], 2, now);

        // "old" has the oldest last contribution, frequency notwithstanding.
        assert!(!merged.keywords.contains(&"old".to_string()));
        assert!(merged.keywords.contains(&"recent".to_string()));
        assert!(merged.keywords.contains(&"fresh".to_string()));
        assert!(!merged.stats.contains_key("old"));
    }

    #[test]
    fn test_eviction_ties_break_by_frequency() {
        let now = Utc::now();
        let state = state_with(&[("rare", 100, 1), ("common", 100, 5)], now);

        let merged = merge_keywords(state, &["fresh".to_string()], 2, now);

        assert!(!merged.keywords.contains(&"rare".to_string()));
        assert!(merged.keywords.contains(&"common".to_string()));
    }

    #[test]
    fn test_current_review_candidates_survive_eviction() {
        let now = Utc::now();
        let state = state_with(&[("a", 300, 1), ("b", 200, 1), ("c", 100, 1)], now);

        let merged = merge_keywords(state, &["fresh".to_string()], 3, now);

        assert!(merged.keywords.contains(&"fresh".to_string()));
        assert!(!merged.keywords.contains(&"a".to_string()));
    }

    #[test]
    fn test_candidates_normalized_and_deduped() {
        let now = Utc::now();
        let state = KeywordState {
            keywords: Vec::new(),
            stats: HashMap::new(),
        };

        let merged = merge_keywords(
            state,
            &[" Spicy ".to_string(), "spicy".to_string(), "".to_string()],
            10,
            now,
        );

        assert_eq!(merged.keywords, vec!["spicy"]);
        // Both candidate mentions count toward frequency.
        assert_eq!(merged.stats["spicy"].frequency, 2);
    }
}
