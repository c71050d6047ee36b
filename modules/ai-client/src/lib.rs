pub mod error;
pub mod gemini;
pub mod schema;
pub mod traits;
pub mod util;

pub use error::{AiError, Result};
pub use gemini::Gemini;
pub use schema::StructuredOutput;
pub use traits::{decode_structured, extract, LanguageModel};
pub use util::{extract_json_block, strip_code_blocks, truncate_to_chars};
