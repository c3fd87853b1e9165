use async_trait::async_trait;
use serde_json::Value;
use wn_core::{NormalizedArticle, Provider, Result};

use super::{str_field, Fetcher};
use crate::config::GdeltConfig;
use crate::logging::Logger;
use crate::timestamp::parse_or_now;

const DOC_API: &str = "https://api.gdeltproject.org/api/v2/doc/doc";

/// GDELT DOC 2.0 article list. No key required.
pub struct GdeltFetcher {
    client: reqwest::Client,
    config: GdeltConfig,
    logger: Logger,
}

impl GdeltFetcher {
    pub fn new(client: reqwest::Client, config: GdeltConfig) -> Self {
        Self {
            client,
            config,
            logger: Logger::for_provider(&Provider::Gdelt),
        }
    }

    fn query(&self) -> String {
        let mut query = self.config.query.trim().to_string();
        if let Some(lang) = &self.config.source_lang {
            query.push_str(&format!(" sourcelang:{}", lang));
        }
        query
    }
}

/// Maps an `artlist` reply. Items without a url or title are dropped.
pub fn parse_response(data: &Value) -> Vec<NormalizedArticle> {
    let Some(items) = data.get("articles").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let url = str_field(item, &["url"])?;
            let title = str_field(item, &["title"])?;
            let topics = item
                .get("themes")
                .and_then(Value::as_array)
                .map(|themes| {
                    themes
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .filter(|themes| !themes.is_empty())
                .unwrap_or_else(|| vec!["Unknown".to_string()]);
            let domain = str_field(item, &["domain"]);

            Some(NormalizedArticle {
                provider: Provider::Gdelt,
                provider_id: None,
                url,
                title,
                summary: None,
                body: None,
                image_url: str_field(item, &["socialimage", "social_image"]),
                published_at: parse_or_now(str_field(item, &["seendate", "date"]).as_deref()),
                source_name: str_field(item, &["source"]).or_else(|| domain.clone()),
                source_domain: domain,
                source_country: str_field(item, &["sourcecountry", "sourceCountry"]),
                language: str_field(item, &["language", "lang", "Language"]),
                topics,
                raw: item.clone(),
            })
        })
        .collect()
}

#[async_trait]
impl Fetcher for GdeltFetcher {
    fn provider(&self) -> Provider {
        Provider::Gdelt
    }

    async fn fetch(&self) -> Result<Vec<NormalizedArticle>> {
        let max_records = self.config.max_records.to_string();
        let query = self.query();
        let params = [
            ("query", query.as_str()),
            ("mode", "artlist"),
            ("format", "json"),
            ("timespan", self.config.timespan.as_str()),
            ("sort", "datedesc"),
            ("maxrecords", max_records.as_str()),
        ];
        self.logger.info(&format!("🌍 Querying DOC API: {}", query));

        let response = self.client.get(DOC_API).query(&params).send().await?;
        let status = response.status();
        let text = response.text().await?;

        // GDELT answers some queries with HTML or an empty body and a 200
        let data: Value = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(_) => {
                let preview: String = text.chars().take(300).collect();
                self.logger.warn(&format!(
                    "Non-JSON response (status {}): {}",
                    status, preview
                ));
                return Ok(Vec::new());
            }
        };

        let articles = parse_response(&data);
        self.logger.info(&format!("📰 {} articles", articles.len()));
        Ok(articles)
    }
}
