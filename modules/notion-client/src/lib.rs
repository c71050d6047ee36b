pub mod error;
pub mod types;

pub use error::{NotionError, Result};
pub use types::{schema, value, Database, Page, Properties, SelectOption};

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;

use types::ErrorBody;

const BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

pub struct NotionClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl NotionClient {
    pub fn new(token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            token: token.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Create a full-page database under `parent_page_id`.
    pub async fn create_database(
        &self,
        parent_page_id: &str,
        title: &str,
        properties: Properties,
    ) -> Result<Database> {
        let body = json!({
            "parent": { "type": "page_id", "page_id": parent_page_id },
            "title": [{ "type": "text", "text": { "content": title } }],
            "properties": properties,
            "is_inline": false,
        });

        self.post("databases", &body).await
    }

    /// Insert a row (page) into a database.
    pub async fn create_page(&self, database_id: &str, properties: Properties) -> Result<Page> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });

        self.post("pages", &body).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &serde_json::Value) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);

        tracing::debug!(path, "Notion API request");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(NotionError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let parsed: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
            return Err(NotionError::Api {
                status: status.as_u16(),
                code: parsed.code,
                message: if parsed.message.is_empty() { text } else { parsed.message },
            });
        }

        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Browser URL for a database id.
pub fn database_url(database_id: &str) -> String {
    format!("https://www.notion.so/{}", database_id.replace('-', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_url_strips_dashes() {
        assert_eq!(
            database_url("1f2e-33aa-bc"),
            "https://www.notion.so/1f2e33aabc"
        );
    }

    #[test]
    fn rate_limited_predicate() {
        assert!(NotionError::RateLimited { retry_after_secs: None }.is_rate_limited());
        assert!(!NotionError::Network("x".into()).is_rate_limited());
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let client = NotionClient::new("secret").with_base_url("http://127.0.0.1:9");
        let err = client.create_page("db", Properties::new()).await.unwrap_err();
        assert!(matches!(err, NotionError::Network(_)));
    }
}
