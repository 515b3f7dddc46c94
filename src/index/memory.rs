use crate::error::Result;
use crate::index::KeywordIndex;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// In-memory keyword index backed by a sharded map of id sets
#[derive(Clone)]
pub struct InMemoryIndex {
    entries: Arc<DashMap<String, HashSet<String>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeywordIndex for InMemoryIndex {
    async fn add(&self, keyword: &str, restaurant_id: &str) -> Result<()> {
        self.entries
            .entry(keyword.to_string())
            .or_default()
            .insert(restaurant_id.to_string());
        Ok(())
    }

    async fn remove(&self, keyword: &str, restaurant_id: &str) -> Result<()> {
        if let Some(mut entry) = self.entries.get_mut(keyword) {
            entry.remove(restaurant_id);
        }
        Ok(())
    }

    async fn query(&self, keyword: &str) -> Result<HashSet<String>> {
        Ok(self
            .entries
            .get(keyword)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_and_query() {
        let index = InMemoryIndex::new();
        index.add("spicy", "r1").await.unwrap();
        index.add("spicy", "r2").await.unwrap();

        let ids = index.query("spicy").await.unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("r1"));
        assert!(ids.contains("r2"));
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let index = InMemoryIndex::new();
        index.add("spicy", "r1").await.unwrap();
        index.add("spicy", "r1").await.unwrap();

        assert_eq!(index.query("spicy").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_non_member_is_noop() {
        let index = InMemoryIndex::new();
        index.remove("spicy", "r1").await.unwrap();
        index.add("spicy", "r1").await.unwrap();
        index.remove("spicy", "r2").await.unwrap();

        assert_eq!(index.query("spicy").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_query_unknown_keyword_is_empty() {
        let index = InMemoryIndex::new();
        assert!(index.query("unknown").await.unwrap().is_empty());
    }
}
