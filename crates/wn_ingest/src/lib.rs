pub mod config;
pub mod fetchers;
pub mod logging;
pub mod orchestrator;
pub mod timestamp;

pub use config::{IngestConfig, ProviderKeys};
pub use fetchers::{build_fetchers, Fetcher};
pub use logging::{init_logging, Logger};
pub use orchestrator::{prepare_rows, IngestReport, Ingestor, ProviderReport};

pub mod prelude {
    pub use super::fetchers::Fetcher;
    pub use wn_core::{Error, NormalizedArticle, Provider, Result};
}
