use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Property map sent when creating a database or page.
pub type Properties = Map<String, Value>;

/// A created database as returned by `POST /v1/databases`.
#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A created page as returned by `POST /v1/pages`.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Error object returned by the API on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// A select option with a display color.
#[derive(Debug, Clone, Serialize)]
pub struct SelectOption {
    pub name: String,
    pub color: String,
}

impl SelectOption {
    pub fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

// --- Database schema property definitions ---

pub mod schema {
    use super::*;

    pub fn title() -> Value {
        json!({ "title": {} })
    }

    pub fn rich_text() -> Value {
        json!({ "rich_text": {} })
    }

    pub fn url() -> Value {
        json!({ "url": {} })
    }

    pub fn number() -> Value {
        json!({ "number": { "format": "number" } })
    }

    pub fn date() -> Value {
        json!({ "date": {} })
    }

    pub fn select(options: &[SelectOption]) -> Value {
        json!({ "select": { "options": options } })
    }
}

// --- Page property values ---

pub mod value {
    use super::*;

    pub fn title(text: &str) -> Value {
        json!({ "title": [{ "text": { "content": text } }] })
    }

    pub fn rich_text(text: &str) -> Value {
        json!({ "rich_text": [{ "text": { "content": text } }] })
    }

    /// Notion rejects empty strings for url properties; `None` clears the field.
    pub fn url(url: &str) -> Value {
        if url.is_empty() {
            json!({ "url": Value::Null })
        } else {
            json!({ "url": url })
        }
    }

    pub fn number(n: f64) -> Value {
        json!({ "number": n })
    }

    pub fn select(name: &str) -> Value {
        json!({ "select": { "name": name } })
    }

    pub fn date(start: &str) -> Value {
        json!({ "date": { "start": start } })
    }
}
