use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;
use wn_core::{NormalizedArticle, Provider, Result};

use crate::config::IngestConfig;

pub mod eventregistry;
pub mod gdelt;
pub mod guardian;
pub mod newsapi;

pub use eventregistry::EventRegistryFetcher;
pub use gdelt::GdeltFetcher;
pub use guardian::GuardianFetcher;
pub use newsapi::NewsApiFetcher;

/// Providers the ingester knows how to reach, in run order.
pub const KNOWN_PROVIDERS: &[Provider] = &[
    Provider::Gdelt,
    Provider::EventRegistry,
    Provider::NewsApi,
    Provider::Guardian,
];

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// The provider tag written on every article
    fn provider(&self) -> Provider;

    /// Pulls the latest batch and maps it to normalized articles
    async fn fetch(&self) -> Result<Vec<NormalizedArticle>>;
}

/// Builds one fetcher per requested provider. Providers that need a key and
/// have none are skipped with a warning.
pub fn build_fetchers(config: &IngestConfig, providers: &[Provider]) -> Result<Vec<Box<dyn Fetcher>>> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .user_agent(concat!("world-news/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let mut fetchers: Vec<Box<dyn Fetcher>> = Vec::new();
    for provider in providers {
        match provider {
            Provider::Gdelt => {
                fetchers.push(Box::new(GdeltFetcher::new(client.clone(), config.gdelt.clone())));
            }
            Provider::EventRegistry => match &config.keys.event_registry {
                Some(key) => fetchers.push(Box::new(EventRegistryFetcher::new(
                    client.clone(),
                    key.clone(),
                    config.event_registry.clone(),
                ))),
                None => warn!("⚠️ Skipping eventregistry: EVENTREGISTRY_API_KEY is not set"),
            },
            Provider::NewsApi => match &config.keys.newsapi {
                Some(key) => fetchers.push(Box::new(NewsApiFetcher::new(
                    client.clone(),
                    key.clone(),
                    config.newsapi.clone(),
                ))),
                None => warn!("⚠️ Skipping newsapi: NEWSAPI_KEY is not set"),
            },
            Provider::Guardian => match &config.keys.guardian {
                Some(key) => fetchers.push(Box::new(GuardianFetcher::new(
                    client.clone(),
                    key.clone(),
                    config.guardian.clone(),
                ))),
                None => warn!("⚠️ Skipping guardian: GUARDIAN_KEY is not set"),
            },
            Provider::Other(name) => warn!("⚠️ No fetcher for provider '{}'", name),
        }
    }
    Ok(fetchers)
}

/// First non-empty string among `keys` on a JSON object.
pub(crate) fn str_field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| item.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKeys;
    use serde_json::json;

    #[test]
    fn test_providers_without_keys_are_skipped() {
        let config = IngestConfig::default();
        let fetchers = build_fetchers(&config, KNOWN_PROVIDERS).unwrap();
        let providers: Vec<_> = fetchers.iter().map(|f| f.provider()).collect();
        assert_eq!(providers, vec![Provider::Gdelt]);
    }

    #[test]
    fn test_keyed_providers_are_built() {
        let config = IngestConfig::default().with_keys(ProviderKeys {
            event_registry: Some("er".to_string()),
            newsapi: Some("na".to_string()),
            guardian: Some("gu".to_string()),
        });
        let fetchers = build_fetchers(&config, KNOWN_PROVIDERS).unwrap();
        let providers: Vec<_> = fetchers.iter().map(|f| f.provider()).collect();
        assert_eq!(providers, KNOWN_PROVIDERS.to_vec());
    }

    #[test]
    fn test_str_field_skips_blank_values() {
        let item = json!({"a": "  ", "b": 3, "c": " value "});
        assert_eq!(str_field(&item, &["a", "b", "c"]), Some("value".to_string()));
        assert_eq!(str_field(&item, &["missing"]), None);
    }
}
