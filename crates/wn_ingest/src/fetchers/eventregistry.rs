use async_trait::async_trait;
use serde_json::{json, Value};
use wn_analysis::categorize_text;
use wn_core::{Error, NormalizedArticle, Provider, Result};

use super::{str_field, Fetcher};
use crate::config::EventRegistryConfig;
use crate::logging::Logger;
use crate::timestamp::parse_or_now;

const ARTICLES_API: &str = "https://eventregistry.org/api/v1/article/getArticles";
/// Largest page the API serves.
const PAGE_SIZE: usize = 100;

pub struct EventRegistryFetcher {
    client: reqwest::Client,
    api_key: String,
    config: EventRegistryConfig,
    logger: Logger,
}

impl EventRegistryFetcher {
    pub fn new(client: reqwest::Client, api_key: String, config: EventRegistryConfig) -> Self {
        Self {
            client,
            api_key,
            config,
            logger: Logger::for_provider(&Provider::EventRegistry),
        }
    }

    fn request_body(&self, page: usize, count: usize) -> Value {
        let mut body = json!({
            "action": "getArticles",
            "keyword": self.config.keywords,
            "keywordOper": "or",
            "resultType": "articles",
            "articlesPage": page,
            "articlesCount": count,
            "articlesSortBy": "date",
            "includeArticleCategories": true,
            "includeArticleLocation": true,
            "includeSourceLocation": true,
            "apiKey": self.api_key,
        });
        if let Some(lang) = &self.config.lang {
            body["lang"] = json!(lang);
        }
        body
    }
}

/// Country label from a location-ish object: a plain string, `label`, or `label.eng`.
fn country_label(value: Option<&Value>) -> Option<String> {
    let value = value?;
    if let Some(s) = value.as_str() {
        return Some(s.to_string()).filter(|s| !s.is_empty());
    }
    let label = value.get("label")?;
    label
        .as_str()
        .or_else(|| label.get("eng").and_then(Value::as_str))
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

/// Provider category labels, lowercased.
fn category_labels(art: &Value) -> Vec<String> {
    let cats = art
        .get("categories")
        .or_else(|| art.get("categoriesEng"))
        .and_then(Value::as_array);
    cats.into_iter()
        .flatten()
        .filter_map(|c| match c {
            Value::String(s) => Some(s.clone()),
            Value::Object(_) => str_field(c, &["label", "name", "uri"]),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect()
}

fn parse_article(art: &Value) -> Option<NormalizedArticle> {
    let url = str_field(art, &["url"])?;
    let title = str_field(art, &["title"])?;
    let summary = str_field(art, &["summary"]);
    let body = str_field(art, &["body"]).or_else(|| summary.clone());
    let source = art.get("source").cloned().unwrap_or(Value::Null);

    let source_country = country_label(art.get("location").and_then(|l| l.get("country")))
        .or_else(|| country_label(source.get("location").and_then(|l| l.get("country"))))
        .or_else(|| country_label(source.get("country")))
        .unwrap_or_else(|| "Unknown".to_string());

    let text_blob = format!("{} {}", title, body.as_deref().unwrap_or_default());
    let mut topics: Vec<String> = categorize_text(&text_blob).into_iter().map(str::to_string).collect();
    if topics.is_empty() {
        topics = category_labels(art);
    }

    Some(NormalizedArticle {
        provider: Provider::EventRegistry,
        provider_id: str_field(art, &["uri"]),
        url,
        title,
        summary,
        body,
        image_url: str_field(art, &["image"]),
        published_at: parse_or_now(str_field(art, &["dateTime", "date"]).as_deref()),
        source_name: str_field(&source, &["title"]),
        source_domain: str_field(&source, &["uri"]),
        source_country: Some(source_country),
        language: str_field(art, &["lang", "language"]),
        topics,
        raw: art.clone(),
    })
}

/// Maps one `getArticles` page. Returns the articles and the total page count.
pub fn parse_response(data: &Value) -> Result<(Vec<NormalizedArticle>, usize)> {
    if let Some(error) = data.get("error") {
        return Err(Error::Fetch(format!("eventregistry: {}", error)));
    }
    let block = data.get("articles").unwrap_or(&Value::Null);
    let pages = block.get("pages").and_then(Value::as_u64).unwrap_or(1) as usize;
    let articles = block
        .get("results")
        .and_then(Value::as_array)
        .map(|results| results.iter().filter_map(parse_article).collect())
        .unwrap_or_default();
    Ok((articles, pages))
}

#[async_trait]
impl Fetcher for EventRegistryFetcher {
    fn provider(&self) -> Provider {
        Provider::EventRegistry
    }

    async fn fetch(&self) -> Result<Vec<NormalizedArticle>> {
        if self.config.keywords.is_empty() {
            return Err(Error::Config("eventregistry needs at least one keyword".to_string()));
        }

        let mut out = Vec::new();
        let mut page = 1;
        while out.len() < self.config.max_items {
            let count = PAGE_SIZE.min(self.config.max_items - out.len());
            let logger = self.logger.clone().with_prefix(format!("[page {}]", page));
            logger.debug(&format!("requesting {} articles", count));

            let data: Value = self
                .client
                .post(ARTICLES_API)
                .json(&self.request_body(page, count))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            let (articles, pages) = parse_response(&data)?;
            let received = articles.len();
            out.extend(articles);
            if received == 0 || page >= pages {
                break;
            }
            page += 1;
        }
        out.truncate(self.config.max_items);

        self.logger.info(&format!("📰 {} articles", out.len()));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn fixture() -> Value {
        json!({
            "articles": {
                "page": 1,
                "pages": 3,
                "results": [
                    {
                        "uri": "8001",
                        "url": "https://news.example.se/a",
                        "title": "Central bank raises interest rates",
                        "body": "Inflation and unemployment are climbing.",
                        "dateTime": "2025-01-02T10:15:00Z",
                        "lang": "swe",
                        "source": {
                            "uri": "news.example.se",
                            "title": "Example News",
                            "location": {"country": {"label": {"eng": "Sweden"}}}
                        }
                    },
                    {
                        "uri": "8002",
                        "url": "https://news.example.se/b",
                        "title": "Quiet day",
                        "summary": "Nothing notable happened.",
                        "date": "2025-01-03",
                        "categories": [{"uri": "dmoz/Business", "label": "dmoz/Business"}, "News"],
                        "source": {"title": "Example News"}
                    },
                    {"uri": "8003", "title": "Missing url"}
                ]
            }
        })
    }

    #[test]
    fn test_parse_page() {
        let (articles, pages) = parse_response(&fixture()).unwrap();
        assert_eq!(pages, 3);
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.provider_id.as_deref(), Some("8001"));
        assert_eq!(first.topics, vec!["economy"]);
        assert_eq!(first.source_country.as_deref(), Some("Sweden"));
        assert_eq!(first.source_domain.as_deref(), Some("news.example.se"));
        assert_eq!(first.language.as_deref(), Some("swe"));
        assert_eq!(first.published_at, Utc.with_ymd_and_hms(2025, 1, 2, 10, 15, 0).unwrap());
    }

    #[test]
    fn test_category_fallback_and_unknown_country() {
        let (articles, _) = parse_response(&fixture()).unwrap();
        let second = &articles[1];
        assert_eq!(second.topics, vec!["dmoz/business", "news"]);
        assert_eq!(second.source_country.as_deref(), Some("Unknown"));
        assert_eq!(second.body.as_deref(), Some("Nothing notable happened."));
        assert_eq!(second.published_at, Utc.with_ymd_and_hms(2025, 1, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_api_error_is_surfaced() {
        let err = parse_response(&json!({"error": "Invalid API key"})).unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[test]
    fn test_request_body() {
        let mut config = crate::config::IngestConfig::default().event_registry;
        config.lang = Some("eng".to_string());
        let fetcher = EventRegistryFetcher::new(reqwest::Client::new(), "key".to_string(), config);
        let body = fetcher.request_body(2, 50);
        assert_eq!(body["articlesPage"], 2);
        assert_eq!(body["articlesCount"], 50);
        assert_eq!(body["keyword"][0], "economy");
        assert_eq!(body["lang"], "eng");
        assert_eq!(body["apiKey"], "key");
    }
}
