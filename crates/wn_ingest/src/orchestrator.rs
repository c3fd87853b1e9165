use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use wn_analysis::{normalize_language, normalize_topics};
use wn_core::{
    article_id_from_url, normalize_url, ArticleStorage, Error, NormalizedArticle, Provider, Result,
    StoredArticle,
};

use crate::fetchers::Fetcher;
use crate::logging::Logger;

/// Outcome of one provider within a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderReport {
    pub provider: Provider,
    pub fetched: usize,
    /// Distinct article ids in the batch.
    pub unique: usize,
    pub inserted: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub providers: Vec<ProviderReport>,
}

impl IngestReport {
    pub fn fetched(&self) -> usize {
        self.providers.iter().map(|p| p.fetched).sum()
    }

    pub fn unique(&self) -> usize {
        self.providers.iter().map(|p| p.unique).sum()
    }

    pub fn inserted(&self) -> usize {
        self.providers.iter().map(|p| p.inserted).sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ProviderReport> {
        self.providers.iter().filter(|p| p.error.is_some())
    }
}

/// Turns fetched articles into storable rows.
///
/// GDELT keeps its own theme tags; every other provider is reconciled with
/// the topic taxonomy, using title and summary as the fallback text. Rows
/// sharing an id collapse to the first one seen.
pub fn prepare_rows(articles: Vec<NormalizedArticle>) -> Vec<StoredArticle> {
    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(articles.len());

    for article in articles {
        let url = normalize_url(&article.url);
        let article_id = article_id_from_url(&url);
        if !seen.insert(article_id.clone()) {
            continue;
        }

        let topics = match article.provider {
            Provider::Gdelt => article.topics.clone(),
            _ => normalize_topics(article.topics.as_slice(), Some(&article.text_blob())),
        };

        rows.push(StoredArticle {
            article_id,
            language: normalize_language(article.language.as_deref()),
            provider: article.provider,
            provider_id: article.provider_id,
            url,
            title: article.title,
            summary: article.summary,
            body: article.body,
            image_url: article.image_url,
            published_at: article.published_at,
            source_name: article.source_name,
            source_domain: article.source_domain,
            source_country: article.source_country,
            topics,
        });
    }
    rows
}

pub struct Ingestor {
    storage: Arc<dyn ArticleStorage>,
    fetchers: Vec<Box<dyn Fetcher>>,
}

impl Ingestor {
    pub fn new(storage: Arc<dyn ArticleStorage>, fetchers: Vec<Box<dyn Fetcher>>) -> Self {
        Self { storage, fetchers }
    }

    pub fn providers(&self) -> Vec<Provider> {
        self.fetchers.iter().map(|f| f.provider()).collect()
    }

    /// Prepares and stores one provider's batch. Returns `(unique, inserted)`.
    pub async fn store_batch(&self, articles: Vec<NormalizedArticle>) -> Result<(usize, usize)> {
        let rows = prepare_rows(articles);
        let inserted = self.storage.upsert_articles(&rows).await?;
        Ok((rows.len(), inserted))
    }

    /// Fetches every provider concurrently, then stores batches in provider
    /// order. A failing fetch is recorded and the run continues; a storage
    /// failure aborts it.
    pub async fn run_once(&self) -> Result<IngestReport> {
        info!("🚀 Ingesting from {} providers", self.fetchers.len());
        let batches = join_all(self.fetchers.iter().map(|f| f.fetch())).await;

        let mut report = IngestReport::default();
        for (fetcher, batch) in self.fetchers.iter().zip(batches) {
            let provider = fetcher.provider();
            let entry = match batch {
                Ok(articles) => {
                    let fetched = articles.len();
                    let (unique, inserted) = self.store_batch(articles).await?;
                    info!(
                        provider = %provider,
                        fetched,
                        unique,
                        inserted,
                        "💾 Stored batch"
                    );
                    ProviderReport {
                        provider,
                        fetched,
                        unique,
                        inserted,
                        error: None,
                    }
                }
                Err(e) => {
                    Logger::for_provider(&provider).error(&format!("❌ Fetch failed: {}", e));
                    ProviderReport {
                        provider,
                        fetched: 0,
                        unique: 0,
                        inserted: 0,
                        error: Some(e.to_string()),
                    }
                }
            };
            report.providers.push(entry);
        }

        info!(
            fetched = report.fetched(),
            inserted = report.inserted(),
            "✅ Ingestion finished"
        );
        Ok(report)
    }

    /// Runs forever, one ingestion per tick. The first run starts immediately.
    pub async fn run_every(&self, every: Duration) -> Result<()> {
        if every.is_zero() {
            return Err(Error::Config("ingestion interval must be longer than zero".to_string()));
        }
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.run_once().await?;
            info!("⏰ Next ingestion in {:?}", every);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use wn_storage::MemoryStorage;

    fn normalized(provider: Provider, url: &str, title: &str, topics: &[&str]) -> NormalizedArticle {
        NormalizedArticle {
            provider,
            provider_id: None,
            url: url.to_string(),
            title: title.to_string(),
            summary: None,
            body: None,
            image_url: None,
            published_at: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
            source_name: None,
            source_domain: None,
            source_country: None,
            language: Some("eng".to_string()),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            raw: serde_json::Value::Null,
        }
    }

    struct StaticFetcher {
        provider: Provider,
        articles: Vec<NormalizedArticle>,
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        fn provider(&self) -> Provider {
            self.provider.clone()
        }

        async fn fetch(&self) -> Result<Vec<NormalizedArticle>> {
            Ok(self.articles.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl Fetcher for FailingFetcher {
        fn provider(&self) -> Provider {
            Provider::NewsApi
        }

        async fn fetch(&self) -> Result<Vec<NormalizedArticle>> {
            Err(Error::Fetch("upstream down".to_string()))
        }
    }

    #[test]
    fn test_prepare_rows_dedupes_and_normalizes() {
        let rows = prepare_rows(vec![
            normalized(Provider::EventRegistry, " https://Example.com/a/ ", "First", &["environment & climate"]),
            normalized(Provider::EventRegistry, "https://example.com/a", "Second", &["sports"]),
        ]);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.title, "First");
        assert_eq!(row.url, "https://example.com/a");
        assert_eq!(row.article_id, article_id_from_url("https://example.com/a"));
        assert_eq!(row.topics, vec!["environment_climate"]);
        assert_eq!(row.language.as_deref(), Some("English"));
    }

    #[test]
    fn test_gdelt_topics_bypass_normalization() {
        let rows = prepare_rows(vec![
            normalized(Provider::Gdelt, "https://example.com/g", "Football final", &["Unknown"]),
            normalized(Provider::Guardian, "https://example.com/h", "Football final", &["zzz"]),
        ]);
        assert_eq!(rows[0].topics, vec!["Unknown"]);
        assert_eq!(rows[1].topics, vec!["sports"]);
    }

    #[tokio::test]
    async fn test_run_once_reports_per_provider() {
        let storage = Arc::new(MemoryStorage::new());
        let gdelt = StaticFetcher {
            provider: Provider::Gdelt,
            articles: vec![
                normalized(Provider::Gdelt, "https://example.com/1", "One", &[]),
                normalized(Provider::Gdelt, "https://example.com/1/", "One again", &[]),
                normalized(Provider::Gdelt, "https://example.com/2", "Two", &[]),
            ],
        };
        let ingestor = Ingestor::new(storage.clone(), vec![Box::new(gdelt), Box::new(FailingFetcher)]);
        assert_eq!(ingestor.providers(), vec![Provider::Gdelt, Provider::NewsApi]);

        let report = ingestor.run_once().await.unwrap();
        assert_eq!(report.fetched(), 3);
        assert_eq!(report.unique(), 2);
        assert_eq!(report.inserted(), 2);
        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].provider, Provider::NewsApi);

        // second run inserts nothing new
        let again = ingestor.run_once().await.unwrap();
        assert_eq!(again.inserted(), 0);
        assert_eq!(storage.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_run_every_rejects_zero_interval() {
        let ingestor = Ingestor::new(Arc::new(MemoryStorage::new()), vec![]);
        let result = ingestor.run_every(Duration::from_secs(0)).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
