use std::sync::Arc;

use tracing::{info, warn};

use factlens_archive::validate_urls;

use crate::traits::WebSearcher;

pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Turns a topic into candidate article URLs.
pub struct SearchAgent {
    searcher: Arc<dyn WebSearcher>,
}

impl SearchAgent {
    pub fn new(searcher: Arc<dyn WebSearcher>) -> Self {
        Self { searcher }
    }

    /// Search for `topic` and return at most `max_results` valid http(s) URLs.
    ///
    /// Search failures are logged and produce an empty list.
    pub async fn search(&self, topic: &str, max_results: usize) -> Vec<String> {
        let results = match self.searcher.search(topic, max_results).await {
            Ok(results) => results,
            Err(e) => {
                warn!(topic, error = %e, "Search failed");
                return Vec::new();
            }
        };

        let urls: Vec<String> = results
            .into_iter()
            .map(|r| r.url)
            .take(max_results)
            .collect();
        let valid = validate_urls(&urls);

        info!(topic, found = urls.len(), valid = valid.len(), "Search complete");
        valid
    }
}
