pub mod clean;
pub mod error;
pub mod metadata;
mod page;
mod readability;
mod search;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use clean::{clean_content, MIN_CONTENT_CHARS};
pub use error::{ArchiveError, Result};
pub use metadata::{extract_metadata, extract_title, title_from_url};
pub use page::HttpPageFetcher;
pub use search::{validate_urls, SerperSearch};
pub use traits::{PageFetcher, WebSearcher};
