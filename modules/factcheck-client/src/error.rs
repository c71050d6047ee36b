use thiserror::Error;

pub type Result<T> = std::result::Result<T, FactCheckError>;

#[derive(Debug, Error)]
pub enum FactCheckError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FactCheckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FactCheckError::Parse(err.to_string())
        } else {
            FactCheckError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FactCheckError {
    fn from(err: serde_json::Error) -> Self {
        FactCheckError::Parse(err.to_string())
    }
}
