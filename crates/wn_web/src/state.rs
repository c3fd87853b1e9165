use std::sync::Arc;
use wn_analysis::ReportOptions;
use wn_core::ArticleStorage;

pub struct AppState {
    pub storage: Arc<dyn ArticleStorage>,
    /// Defaults for the cluster endpoint.
    pub report_options: ReportOptions,
}

impl AppState {
    pub fn new(storage: Arc<dyn ArticleStorage>) -> Self {
        Self {
            storage,
            report_options: ReportOptions::default(),
        }
    }
}
