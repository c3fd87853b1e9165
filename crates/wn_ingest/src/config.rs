//! Provider queries and limits for an ingestion run.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GdeltConfig {
    /// Free text or GDELT operators, e.g. `(economy OR inflation)`.
    pub query: String,
    pub timespan: String,
    pub max_records: u32,
    /// Appended to the query as `sourcelang:<value>`.
    pub source_lang: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EventRegistryConfig {
    pub keywords: Vec<String>,
    pub max_items: usize,
    /// Three-letter language code, e.g. `eng`.
    pub lang: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    pub country: String,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct GuardianConfig {
    pub section: String,
    pub page_size: u32,
}

/// API credentials. A provider whose key is missing is skipped.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    pub event_registry: Option<String>,
    pub newsapi: Option<String>,
    pub guardian: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub gdelt: GdeltConfig,
    pub event_registry: EventRegistryConfig,
    pub newsapi: NewsApiConfig,
    pub guardian: GuardianConfig,
    pub keys: ProviderKeys,
    pub request_timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            gdelt: GdeltConfig {
                query: "(economy OR business OR finance OR technology OR politics OR sports OR health)"
                    .to_string(),
                timespan: "24h".to_string(),
                max_records: 250,
                source_lang: None,
            },
            event_registry: EventRegistryConfig {
                keywords: ["economy", "technology", "politics", "sports", "health"]
                    .iter()
                    .map(|k| k.to_string())
                    .collect(),
                max_items: 250,
                lang: None,
            },
            newsapi: NewsApiConfig {
                country: "us".to_string(),
                category: "technology".to_string(),
            },
            guardian: GuardianConfig {
                section: "technology".to_string(),
                page_size: 50,
            },
            keys: ProviderKeys::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl IngestConfig {
    pub fn with_keys(mut self, keys: ProviderKeys) -> Self {
        self.keys = keys;
        self
    }
}
