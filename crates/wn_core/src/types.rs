use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the feed an article came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    Gdelt,
    EventRegistry,
    NewsApi,
    Guardian,
    Other(String),
}

impl Provider {
    pub fn as_str(&self) -> &str {
        match self {
            Provider::Gdelt => "gdelt",
            Provider::EventRegistry => "eventregistry",
            Provider::NewsApi => "newsapi",
            Provider::Guardian => "guardian",
            Provider::Other(name) => name,
        }
    }
}

impl From<&str> for Provider {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "gdelt" => Provider::Gdelt,
            "eventregistry" => Provider::EventRegistry,
            "newsapi" => Provider::NewsApi,
            "guardian" => Provider::Guardian,
            other => Provider::Other(other.to_string()),
        }
    }
}

impl From<String> for Provider {
    fn from(value: String) -> Self {
        Provider::from(value.as_str())
    }
}

impl From<Provider> for String {
    fn from(value: Provider) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An article as produced by a fetcher, before ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedArticle {
    pub provider: Provider,
    pub provider_id: Option<String>,
    pub url: String,
    pub title: String,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub source_name: Option<String>,
    pub source_domain: Option<String>,
    pub source_country: Option<String>,
    pub language: Option<String>,
    pub topics: Vec<String>,
    /// Original provider payload, kept for debugging.
    pub raw: serde_json::Value,
}

impl NormalizedArticle {
    /// Title and summary joined, used as the classifier fallback text.
    pub fn text_blob(&self) -> String {
        format!("{} {}", self.title, self.summary.as_deref().unwrap_or_default())
    }
}

/// A persisted article row. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArticle {
    pub article_id: String,
    pub provider: Provider,
    pub provider_id: Option<String>,
    pub url: String,
    pub title: String,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub source_name: Option<String>,
    pub source_domain: Option<String>,
    pub source_country: Option<String>,
    pub language: Option<String>,
    pub topics: Vec<String>,
}

impl StoredArticle {
    /// Text scanned for narrative frames: the body, or the summary when the body is empty.
    pub fn framing_text(&self) -> &str {
        match self.body.as_deref() {
            Some(body) if !body.is_empty() => body,
            _ => self.summary.as_deref().unwrap_or_default(),
        }
    }
}

/// Time-window query over stored articles.
#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
    pub since: Option<DateTime<Utc>>,
    pub provider: Option<Provider>,
    pub limit: Option<usize>,
}

impl ArticleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, article: &StoredArticle) -> bool {
        if let Some(since) = self.since {
            if article.published_at < since {
                return false;
            }
        }
        match &self.provider {
            Some(provider) => &article.provider == provider,
            None => true,
        }
    }
}
