// Test doubles for WebSearcher and PageFetcher: no network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use factlens_common::{PageMetadata, ScrapedPage, SearchResult};

use crate::error::{ArchiveError, Result};
use crate::traits::{PageFetcher, WebSearcher};

/// Canned search results. Every query returns the same list, or an error if
/// built with `failing()`.
pub struct MockSearcher {
    results: Vec<SearchResult>,
    fail: bool,
    queries: Mutex<Vec<String>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.results.push(SearchResult {
            url: url.to_string(),
            title: String::new(),
            snippet: String::new(),
        });
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(ArchiveError::FetchFailed("mock search outage".into()));
        }
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}

/// Page fetcher keyed by URL. Unknown URLs behave like an HTTP 404.
pub struct MockPageFetcher {
    pages: HashMap<String, ScrapedPage>,
    fetched: Mutex<Vec<String>>,
}

impl MockPageFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn on_page(mut self, url: &str, title: &str, content: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            ScrapedPage {
                url: url.to_string(),
                title: title.to_string(),
                content: content.to_string(),
                metadata: PageMetadata {
                    title: Some(title.to_string()),
                    ..PageMetadata::default()
                },
            },
        );
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl Default for MockPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch(&self, url: &str) -> Result<ScrapedPage> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| ArchiveError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}
