use async_trait::async_trait;
use serde_json::Value;
use wn_core::{NormalizedArticle, Provider, Result};

use super::{str_field, Fetcher};
use crate::config::GuardianConfig;
use crate::logging::Logger;
use crate::timestamp::parse_or_now;

const SEARCH_API: &str = "https://content.guardianapis.com/search";
const SHOW_FIELDS: &str = "thumbnail,headline,body,trailText";

pub struct GuardianFetcher {
    client: reqwest::Client,
    api_key: String,
    config: GuardianConfig,
    logger: Logger,
}

impl GuardianFetcher {
    pub fn new(client: reqwest::Client, api_key: String, config: GuardianConfig) -> Self {
        Self {
            client,
            api_key,
            config,
            logger: Logger::for_provider(&Provider::Guardian),
        }
    }
}

pub fn parse_response(data: &Value, section: &str) -> Vec<NormalizedArticle> {
    let Some(results) = data
        .get("response")
        .and_then(|r| r.get("results"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|item| {
            let fields = item.get("fields").cloned().unwrap_or(Value::Null);
            let url = str_field(item, &["webUrl"])?;
            let title = str_field(&fields, &["headline"]).or_else(|| str_field(item, &["webTitle"]))?;
            let topic = str_field(item, &["sectionId"]).unwrap_or_else(|| section.to_string());

            Some(NormalizedArticle {
                provider: Provider::Guardian,
                provider_id: str_field(item, &["id"]),
                url,
                title,
                summary: str_field(&fields, &["trailText"]),
                body: str_field(&fields, &["body"]),
                image_url: str_field(&fields, &["thumbnail"]),
                published_at: parse_or_now(str_field(item, &["webPublicationDate"]).as_deref()),
                source_name: Some("The Guardian".to_string()),
                source_domain: Some("theguardian.com".to_string()),
                source_country: Some("GB".to_string()),
                language: Some("en".to_string()),
                topics: vec![topic],
                raw: item.clone(),
            })
        })
        .collect()
}

#[async_trait]
impl Fetcher for GuardianFetcher {
    fn provider(&self) -> Provider {
        Provider::Guardian
    }

    async fn fetch(&self) -> Result<Vec<NormalizedArticle>> {
        let page_size = self.config.page_size.to_string();
        let params = [
            ("section", self.config.section.as_str()),
            ("page-size", page_size.as_str()),
            ("api-key", self.api_key.as_str()),
            ("show-fields", SHOW_FIELDS),
            ("order-by", "newest"),
        ];
        let data: Value = self
            .client
            .get(SEARCH_API)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let articles = parse_response(&data, &self.config.section);
        self.logger.info(&format!("📰 {} articles", articles.len()));
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_parse_search_results() {
        let data = json!({
            "response": {
                "status": "ok",
                "results": [
                    {
                        "id": "technology/2025/jan/02/chips",
                        "sectionId": "technology",
                        "webTitle": "Chips, web title",
                        "webUrl": "https://www.theguardian.com/technology/2025/jan/02/chips",
                        "webPublicationDate": "2025-01-02T10:15:00Z",
                        "fields": {
                            "headline": "Chips, headline",
                            "trailText": "Short teaser",
                            "thumbnail": "https://media.guim.co.uk/chips.jpg"
                        }
                    },
                    {
                        "id": "no-fields",
                        "webTitle": "Only a web title",
                        "webUrl": "https://www.theguardian.com/no-fields"
                    }
                ]
            }
        });

        let articles = parse_response(&data, "technology");
        assert_eq!(articles.len(), 2);
        let first = &articles[0];
        assert_eq!(first.title, "Chips, headline");
        assert_eq!(first.source_country.as_deref(), Some("GB"));
        assert_eq!(first.topics, vec!["technology"]);
        assert_eq!(first.published_at, Utc.with_ymd_and_hms(2025, 1, 2, 10, 15, 0).unwrap());
        assert_eq!(articles[1].title, "Only a web title");
        assert_eq!(articles[1].topics, vec!["technology"]);
    }

    #[test]
    fn test_missing_response_is_empty() {
        assert!(parse_response(&json!({"message": "Unauthorized"}), "technology").is_empty());
    }
}
