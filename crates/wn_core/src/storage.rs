use async_trait::async_trait;
use crate::types::{ArticleQuery, StoredArticle};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Insert articles, skipping any whose `article_id` is already stored.
    /// Returns the number of rows actually inserted.
    async fn upsert_articles(&self, articles: &[StoredArticle]) -> Result<usize>;

    /// Articles matching the query window, newest first
    async fn query_window(&self, query: &ArticleQuery) -> Result<Vec<StoredArticle>>;

    async fn get_article(&self, article_id: &str) -> Result<Option<StoredArticle>>;

    async fn count(&self) -> Result<usize>;
}
