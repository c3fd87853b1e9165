use async_trait::async_trait;
use serde_json::Value;
use wn_core::{Error, NormalizedArticle, Provider, Result};

use super::{str_field, Fetcher};
use crate::config::NewsApiConfig;
use crate::logging::Logger;
use crate::timestamp::parse_or_now;

const TOP_HEADLINES_API: &str = "https://newsapi.org/v2/top-headlines";

pub struct NewsApiFetcher {
    client: reqwest::Client,
    api_key: String,
    config: NewsApiConfig,
    logger: Logger,
}

impl NewsApiFetcher {
    pub fn new(client: reqwest::Client, api_key: String, config: NewsApiConfig) -> Self {
        Self {
            client,
            api_key,
            config,
            logger: Logger::for_provider(&Provider::NewsApi),
        }
    }
}

/// Maps a top-headlines reply; the configured category becomes the topic.
pub fn parse_response(data: &Value, config: &NewsApiConfig) -> Result<Vec<NormalizedArticle>> {
    if data.get("status").and_then(Value::as_str) == Some("error") {
        let message = str_field(data, &["message", "code"]).unwrap_or_default();
        return Err(Error::Fetch(format!("newsapi: {}", message)));
    }

    let Some(items) = data.get("articles").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            let url = str_field(item, &["url"])?;
            let title = str_field(item, &["title"])?;
            let source_name = item.get("source").and_then(|s| str_field(s, &["name"]));
            let source_domain = url::Url::parse(&url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string));

            Some(NormalizedArticle {
                provider: Provider::NewsApi,
                provider_id: None,
                url,
                title,
                summary: str_field(item, &["description"]),
                body: str_field(item, &["content"]),
                image_url: str_field(item, &["urlToImage"]),
                published_at: parse_or_now(str_field(item, &["publishedAt"]).as_deref()),
                source_name,
                source_domain,
                source_country: Some(config.country.to_uppercase()),
                language: Some("en".to_string()),
                topics: vec![config.category.clone()],
                raw: item.clone(),
            })
        })
        .collect())
}

#[async_trait]
impl Fetcher for NewsApiFetcher {
    fn provider(&self) -> Provider {
        Provider::NewsApi
    }

    async fn fetch(&self) -> Result<Vec<NormalizedArticle>> {
        let params = [
            ("country", self.config.country.as_str()),
            ("category", self.config.category.as_str()),
            ("apiKey", self.api_key.as_str()),
        ];
        let data: Value = self
            .client
            .get(TOP_HEADLINES_API)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let articles = parse_response(&data, &self.config)?;
        self.logger.info(&format!("📰 {} articles", articles.len()));
        Ok(articles)
    }
}
