// Article page fetching over plain HTTP.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use factlens_common::ScrapedPage;

use crate::error::{ArchiveError, Result};
use crate::metadata::{extract_metadata, title_from_url};
use crate::readability::article_markdown;
use crate::traits::PageFetcher;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<ScrapedPage> {
        let parsed = url::Url::parse(url).map_err(|e| ArchiveError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ArchiveError::InvalidUrl {
                url: url.to_string(),
                reason: format!("only http/https allowed, got {}", parsed.scheme()),
            });
        }

        info!(url, "page: fetching");

        let resp = self.client.get(parsed).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "page: non-success status");
            return Err(ArchiveError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = resp.bytes().await?;
        if html.is_empty() {
            return Err(ArchiveError::Empty(url.to_string()));
        }

        let raw_html = String::from_utf8_lossy(&html);
        let metadata = extract_metadata(&raw_html);
        let title = metadata
            .title
            .clone()
            .unwrap_or_else(|| title_from_url(url));
        let content = article_markdown(&html, url);

        info!(url, bytes = html.len(), chars = content.len(), "page: fetched");

        Ok(ScrapedPage {
            url: url.to_string(),
            title,
            content,
            metadata,
        })
    }
}
