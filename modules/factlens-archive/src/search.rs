// Web search via Serper (Google results).

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use factlens_common::SearchResult;

use crate::error::{ArchiveError, Result};
use crate::traits::WebSearcher;

const SERPER_URL: &str = "https://google.serper.dev/search";

#[derive(Debug, serde::Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, serde::Deserialize)]
struct SerperResult {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

pub struct SerperSearch {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl SerperSearch {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            endpoint: SERPER_URL.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl WebSearcher for SerperSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        info!(query, max_results, "search: querying serper");

        let body = serde_json::json!({
            "q": query,
            "num": max_results,
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ArchiveError::Status {
                url: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let data: SerperResponse = resp.json().await?;

        let results: Vec<SearchResult> = data
            .organic
            .into_iter()
            .filter(|r| !r.link.is_empty())
            .take(max_results)
            .map(|r| SearchResult {
                url: r.link,
                title: r.title,
                snippet: r.snippet,
            })
            .collect();

        info!(query, count = results.len(), "search: complete");
        Ok(results)
    }
}

/// Keep only absolute http(s) URLs, logging each one dropped.
pub fn validate_urls(urls: &[String]) -> Vec<String> {
    urls.iter()
        .filter(|raw| match url::Url::parse(raw) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => true,
            _ => {
                warn!(url = raw.as_str(), "search: skipping invalid URL");
                false
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_urls_keeps_http_and_https() {
        let urls = vec![
            "https://example.org/a".to_string(),
            "http://example.org/b".to_string(),
            "ftp://example.org/c".to_string(),
            "javascript:alert(1)".to_string(),
            "/relative/path".to_string(),
            "".to_string(),
        ];
        assert_eq!(
            validate_urls(&urls),
            vec!["https://example.org/a", "http://example.org/b"]
        );
    }

    #[test]
    fn serper_response_tolerates_missing_fields() {
        let json = r#"{"organic": [{"link": "https://a.example"}, {"title": "no link"}]}"#;
        let parsed: SerperResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.organic.len(), 2);
        assert_eq!(parsed.organic[0].link, "https://a.example");
        assert!(parsed.organic[1].link.is_empty());
    }

    #[test]
    fn serper_response_without_organic_is_empty() {
        let parsed: SerperResponse = serde_json::from_str(r#"{"knowledgeGraph": {}}"#).unwrap();
        assert!(parsed.organic.is_empty());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_fetch_error() {
        let search = SerperSearch::new("key").with_endpoint("http://127.0.0.1:9/search");
        let err = search.search("seeds", 5).await.unwrap_err();
        assert!(matches!(err, ArchiveError::FetchFailed(_)));
    }
}
