// Seams between the pipeline and the network.
//
// WebSearcher covers the search API, PageFetcher covers article pages.
// Tests substitute the mocks in `testing`.

use async_trait::async_trait;

use factlens_common::{ScrapedPage, SearchResult};

use crate::error::Result;

#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Run a web search, returning at most `max_results` organic hits.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page and reduce it to readable text plus head metadata.
    ///
    /// The returned content is raw extraction output; callers clean and bound it.
    async fn fetch(&self, url: &str) -> Result<ScrapedPage>;
}
