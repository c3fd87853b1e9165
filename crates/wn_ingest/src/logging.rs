use std::collections::VecDeque;
use std::sync::Once;
use tracing_subscriber::EnvFilter;
use wn_core::Provider;

static INIT: Once = Once::new();

/// Prefixes every message with a chain of tags, e.g. `[gdelt] [page 2]`.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_provider(provider: &Provider) -> Self {
        Self::new().with_prefix(format!("[{}]", provider))
    }

    pub fn with_prefix(mut self, prefix: String) -> Self {
        self.prefixes.push_back(prefix);
        self
    }

    fn render(&self, message: &str) -> String {
        let prefix = self.prefixes.iter().map(|p| format!("{} ", p)).collect::<String>();
        format!("{}{}", prefix, message)
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}", self.render(message));
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}", self.render(message));
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}", self.render(message));
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}", self.render(message));
    }
}

/// Installs the fmt subscriber once. `RUST_LOG` overrides the `info` default.
pub fn init_logging() -> Logger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            tracing_subscriber::fmt().with_env_filter(filter).init();
        });
    }
    Logger::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_chain_in_order() {
        let logger = Logger::for_provider(&Provider::Gdelt).with_prefix("[page 2]".to_string());
        assert_eq!(logger.render("fetched 10"), "[gdelt] [page 2] fetched 10");
        assert_eq!(Logger::new().render("ok"), "ok");
    }

    #[test]
    fn test_init_logging_is_repeatable() {
        init_logging();
        init_logging().info("still fine");
    }
}
