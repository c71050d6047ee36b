use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use factlens_archive::{clean_content, title_from_url};
use factlens_common::{Article, ScrapedPage};

use super::pause_between;
use crate::traits::PageFetcher;

/// Fetches article pages and reduces them to bounded plain text.
pub struct ScrapeAgent {
    fetcher: Arc<dyn PageFetcher>,
    max_content_length: usize,
    delay: Duration,
}

impl ScrapeAgent {
    pub fn new(fetcher: Arc<dyn PageFetcher>, max_content_length: usize, delay: Duration) -> Self {
        Self {
            fetcher,
            max_content_length,
            delay,
        }
    }

    /// Scrape every URL in order. One record per URL; failures become
    /// placeholder records with empty content and a `scrape_error`.
    pub async fn scrape_urls(&self, urls: &[String]) -> Vec<Article> {
        let mut articles = Vec::with_capacity(urls.len());

        for (i, url) in urls.iter().enumerate() {
            info!(url = url.as_str(), n = i + 1, total = urls.len(), "Scraping");
            articles.push(self.scrape_one(url).await);
            pause_between(i, urls.len(), self.delay).await;
        }

        let ok = articles.iter().filter(|a| a.scrape_error.is_none()).count();
        info!(ok, failed = articles.len() - ok, "Scraping complete");
        articles
    }

    pub async fn scrape_one(&self, url: &str) -> Article {
        match self.fetcher.fetch(url).await {
            Ok(page) => {
                let content = clean_content(&page.content, self.max_content_length);
                let title = if page.title.trim().is_empty() {
                    title_from_url(url)
                } else {
                    page.title.clone()
                };

                if content.is_empty() {
                    warn!(url, "No readable content extracted");
                    return Article::failed(url, &title, "no readable content extracted");
                }

                Article::scraped(ScrapedPage {
                    title,
                    content,
                    ..page
                })
            }
            Err(e) => {
                warn!(url, error = %e, "Scrape failed");
                Article::failed(url, &title_from_url(url), e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factlens_archive::testing::MockPageFetcher;

    fn body() -> String {
        "Seed patents cover engineered traits and restrict replanting. ".repeat(4)
    }

    #[tokio::test]
    async fn missing_page_becomes_placeholder_and_batch_continues() {
        let fetcher = MockPageFetcher::new().on_page("https://ok.example/a", "A", &body());
        let agent = ScrapeAgent::new(Arc::new(fetcher), 5000, Duration::ZERO);

        let urls = vec![
            "https://gone.example/missing-story".to_string(),
            "https://ok.example/a".to_string(),
        ];
        let articles = agent.scrape_urls(&urls).await;

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].content, "");
        assert_eq!(articles[0].title, "Missing Story");
        assert!(articles[0].scrape_error.as_deref().unwrap().contains("404"));
        assert_eq!(articles[1].title, "A");
        assert!(articles[1].has_content());
        assert!(articles[1].scrape_error.is_none());
    }

    #[tokio::test]
    async fn thin_page_counts_as_failure() {
        let fetcher = MockPageFetcher::new().on_page("https://thin.example", "Thin", "Log in");
        let agent = ScrapeAgent::new(Arc::new(fetcher), 5000, Duration::ZERO);

        let article = agent.scrape_one("https://thin.example").await;
        assert_eq!(article.title, "Thin");
        assert!(!article.has_content());
        assert!(article.scrape_error.is_some());
    }

    #[tokio::test]
    async fn content_is_truncated_to_limit() {
        let fetcher = MockPageFetcher::new().on_page("https://long.example", "Long", &body().repeat(10));
        let agent = ScrapeAgent::new(Arc::new(fetcher), 200, Duration::ZERO);

        let article = agent.scrape_one("https://long.example").await;
        assert!(article.content.ends_with("..."));
        assert!(article.content.chars().count() <= 203);
    }

    #[tokio::test]
    async fn blank_title_is_derived_from_url() {
        let fetcher = MockPageFetcher::new().on_page("https://x.example/gmo-facts", " ", &body());
        let agent = ScrapeAgent::new(Arc::new(fetcher), 5000, Duration::ZERO);

        assert_eq!(agent.scrape_one("https://x.example/gmo-facts").await.title, "Gmo Facts");
    }
}
