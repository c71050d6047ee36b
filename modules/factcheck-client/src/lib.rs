pub mod error;
pub mod types;

pub use error::{FactCheckError, Result};
pub use types::{Claim, ClaimReview, ClaimSearchResponse, Publisher};

use std::time::Duration;

const BASE_URL: &str = "https://factchecktools.googleapis.com/v1alpha1";

pub struct FactCheckClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    language_code: String,
}

impl FactCheckClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            language_code: "en".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language_code: &str) -> Self {
        self.language_code = language_code.to_string();
        self
    }

    /// Search published fact-checks matching a free-text claim.
    pub async fn search_claims(&self, query: &str) -> Result<ClaimSearchResponse> {
        let url = format!("{}/claims:search", self.base_url);

        tracing::debug!(query, "Fact check claims:search");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("key", self.api_key.as_str()),
                ("languageCode", self.language_code.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FactCheckError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = FactCheckClient::new("k").with_base_url("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(client.language_code, "en");
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let client = FactCheckClient::new("k").with_base_url("http://127.0.0.1:9");
        let err = client.search_claims("seeds").await.unwrap_err();
        assert!(matches!(err, FactCheckError::Network(_)));
    }
}
