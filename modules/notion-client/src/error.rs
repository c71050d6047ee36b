use thiserror::Error;

pub type Result<T> = std::result::Result<T, NotionError>;

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited by Notion API")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("API error (status {status}, code {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl NotionError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, NotionError::RateLimited { .. })
    }
}

impl From<reqwest::Error> for NotionError {
    fn from(err: reqwest::Error) -> Self {
        NotionError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for NotionError {
    fn from(err: serde_json::Error) -> Self {
        NotionError::Parse(err.to_string())
    }
}
