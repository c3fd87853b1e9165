use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use wn_core::{ArticleQuery, ArticleStorage, Result, StoredArticle};

/// Articles keyed by `article_id`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: HashMap<String, StoredArticle>,
}

impl MemoryStore {
    pub fn insert_new(&mut self, articles: &[StoredArticle]) -> usize {
        let mut inserted = 0;
        for article in articles {
            if self.articles.contains_key(&article.article_id) {
                continue;
            }
            self.articles.insert(article.article_id.clone(), article.clone());
            inserted += 1;
        }
        inserted
    }

    pub fn window(&self, query: &ArticleQuery) -> Vec<StoredArticle> {
        let mut hits: Vec<StoredArticle> = self
            .articles
            .values()
            .filter(|a| query.matches(a))
            .cloned()
            .collect();
        hits.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.article_id.cmp(&b.article_id))
        });
        if let Some(limit) = query.limit {
            hits.truncate(limit);
        }
        hits
    }
}

/// Process-local storage, lost on exit. Used for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn upsert_articles(&self, articles: &[StoredArticle]) -> Result<usize> {
        let mut store = self.store.write().await;
        let inserted = store.insert_new(articles);
        debug!(offered = articles.len(), inserted, "Stored articles in memory");
        Ok(inserted)
    }

    async fn query_window(&self, query: &ArticleQuery) -> Result<Vec<StoredArticle>> {
        let store = self.store.read().await;
        Ok(store.window(query))
    }

    async fn get_article(&self, article_id: &str) -> Result<Option<StoredArticle>> {
        let store = self.store.read().await;
        Ok(store.articles.get(article_id).cloned())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.store.read().await.articles.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use wn_core::Provider;

    fn article(id: &str, provider: Provider, day: u32) -> StoredArticle {
        StoredArticle {
            article_id: id.to_string(),
            provider,
            provider_id: None,
            url: format!("https://example.com/{id}"),
            title: format!("Title {id}"),
            summary: None,
            body: None,
            image_url: None,
            published_at: Utc.with_ymd_and_hms(2025, 3, day, 8, 0, 0).unwrap(),
            source_name: None,
            source_domain: None,
            source_country: None,
            language: None,
            topics: vec!["politics".to_string()],
        }
    }

    #[tokio::test]
    async fn test_memory_storage_skips_existing_ids() {
        let storage = MemoryStorage::new();
        let first = article("a", Provider::Gdelt, 1);
        assert_eq!(storage.upsert_articles(&[first.clone()]).await.unwrap(), 1);

        let mut changed = first.clone();
        changed.title = "Rewritten".to_string();
        let inserted = storage
            .upsert_articles(&[changed, article("b", Provider::Gdelt, 2)])
            .await
            .unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(storage.count().await.unwrap(), 2);

        let kept = storage.get_article("a").await.unwrap().unwrap();
        assert_eq!(kept, first);
        assert!(storage.get_article("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_query_window() {
        let storage = MemoryStorage::new();
        storage
            .upsert_articles(&[
                article("old", Provider::Gdelt, 1),
                article("mid", Provider::Guardian, 5),
                article("new", Provider::Gdelt, 9),
            ])
            .await
            .unwrap();

        let all = storage.query_window(&ArticleQuery::new()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|a| a.article_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);

        let since = Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap();
        let recent = storage
            .query_window(&ArticleQuery::new().since(since))
            .await
            .unwrap();
        assert_eq!(recent.len(), 2);

        let gdelt = storage
            .query_window(&ArticleQuery::new().provider(Provider::Gdelt).limit(1))
            .await
            .unwrap();
        assert_eq!(gdelt.len(), 1);
        assert_eq!(gdelt[0].article_id, "new");
    }
}
