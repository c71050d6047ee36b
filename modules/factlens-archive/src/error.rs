/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("No readable content at {0}")]
    Empty(String),

    #[error("Failed to parse search response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ArchiveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ArchiveError::Parse(err.to_string())
        } else {
            ArchiveError::FetchFailed(err.to_string())
        }
    }
}
