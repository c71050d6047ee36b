pub mod config;
pub mod error;
pub mod types;
pub mod verdict;

pub use config::Config;
pub use error::FactLensError;
pub use types::*;
pub use verdict::{overall_status, status_from_rating};
