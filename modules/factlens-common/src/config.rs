use std::env;
use std::path::PathBuf;

use crate::error::FactLensError;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://articles.db?mode=rwc";
pub const DEFAULT_TEMP_DIR: &str = "temp";
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 5000;

/// Application configuration loaded from environment variables.
///
/// API keys are optional: a missing key disables the stage that needs it
/// instead of failing startup. `warnings()` lists what is disabled.
#[derive(Debug, Clone)]
pub struct Config {
    // Search
    pub serper_api_key: Option<String>,

    // LLM
    pub google_api_key: Option<String>,
    pub gemini_model: String,

    // Fact checking
    pub fact_check_api_key: Option<String>,

    // Notion
    pub notion_token: Option<String>,
    pub notion_parent_page_id: Option<String>,
    pub notion_database_id: Option<String>,
    pub publish_to_notion: bool,
    pub notion_create_db_each_run: bool,

    // Storage
    pub database_url: String,
    pub temp_dir: PathBuf,

    // Scraping
    pub max_content_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serper_api_key: None,
            google_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            fact_check_api_key: None,
            notion_token: None,
            notion_parent_page_id: None,
            notion_database_id: None,
            publish_to_notion: false,
            notion_create_db_each_run: true,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Only malformed values are errors; absent values fall back to defaults.
    pub fn from_env() -> Result<Self, FactLensError> {
        let max_content_length = match optional_env("SCRAPE_MAX_CONTENT_LENGTH") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(FactLensError::Config(format!(
                        "SCRAPE_MAX_CONTENT_LENGTH must be a positive integer, got {raw:?}"
                    )))
                }
            },
            None => DEFAULT_MAX_CONTENT_LENGTH,
        };

        Ok(Self {
            serper_api_key: optional_env("SERPER_API_KEY"),
            google_api_key: optional_env("GOOGLE_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            fact_check_api_key: optional_env("GOOGLE_FACT_CHECK_API_KEY"),
            notion_token: optional_env("NOTION_TOKEN"),
            notion_parent_page_id: optional_env("NOTION_PARENT_PAGE_ID"),
            notion_database_id: optional_env("NOTION_DATABASE_ID"),
            publish_to_notion: flag_env("PUBLISH_TO_NOTION", false),
            notion_create_db_each_run: flag_env("NOTION_CREATE_DB_EACH_RUN", true),
            database_url: optional_env("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            temp_dir: optional_env("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMP_DIR)),
            max_content_length,
        })
    }

    /// Notion publishing needs the opt-in flag plus a token and a parent page.
    pub fn notion_enabled(&self) -> bool {
        self.publish_to_notion && self.notion_token.is_some() && self.notion_parent_page_id.is_some()
    }

    /// Human-readable list of features disabled by missing configuration.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.serper_api_key.is_none() {
            warnings.push("SERPER_API_KEY not set: web search is disabled".to_string());
        }
        if self.google_api_key.is_none() {
            warnings.push(
                "GOOGLE_API_KEY not set: summaries and analysis will use fallbacks".to_string(),
            );
        }
        if self.fact_check_api_key.is_none() {
            warnings.push(
                "GOOGLE_FACT_CHECK_API_KEY not set: fact checking is skipped".to_string(),
            );
        }
        if self.publish_to_notion && !self.notion_enabled() {
            warnings.push(
                "PUBLISH_TO_NOTION is set but NOTION_TOKEN or NOTION_PARENT_PAGE_ID is missing"
                    .to_string(),
            );
        }

        warnings
    }

    /// Log the loaded configuration with secrets reduced to a short preview.
    pub fn log_redacted(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  SERPER_API_KEY: {}", preview_opt(&self.serper_api_key));
        tracing::info!("  GOOGLE_API_KEY: {}", preview_opt(&self.google_api_key));
        tracing::info!("  GEMINI_MODEL: {}", self.gemini_model);
        tracing::info!(
            "  GOOGLE_FACT_CHECK_API_KEY: {}",
            preview_opt(&self.fact_check_api_key)
        );
        tracing::info!("  NOTION_TOKEN: {}", preview_opt(&self.notion_token));
        tracing::info!("  PUBLISH_TO_NOTION: {}", self.publish_to_notion);
        tracing::info!("  DATABASE_URL: {}", self.database_url);
        tracing::info!("  TEMP_DIR: {}", self.temp_dir.display());
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn flag_env(key: &str, default: bool) -> bool {
    match optional_env(key) {
        Some(v) => matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "on"),
        None => default,
    }
}

fn preview(val: &str) -> String {
    let n = val.char_indices().nth(5).map(|(i, _)| i).unwrap_or(val.len());
    format!("{}...({} chars)", &val[..n], val.chars().count())
}

fn preview_opt(val: &Option<String>) -> String {
    match val {
        Some(v) => preview(v),
        None => "<not set>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_hides_most_of_the_secret() {
        assert_eq!(preview("abcdefghij"), "abcde...(10 chars)");
        assert_eq!(preview("abc"), "abc...(3 chars)");
        assert_eq!(preview_opt(&None), "<not set>");
    }

    #[test]
    fn default_config_warns_about_every_missing_key() {
        let config = Config::default();
        let warnings = config.warnings();
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("SERPER_API_KEY")));
        assert!(!config.notion_enabled());
    }

    #[test]
    fn notion_requires_flag_token_and_parent() {
        let mut config = Config {
            notion_token: Some("secret".into()),
            notion_parent_page_id: Some("page".into()),
            ..Config::default()
        };
        assert!(!config.notion_enabled());

        config.publish_to_notion = true;
        assert!(config.notion_enabled());

        config.notion_parent_page_id = None;
        assert!(!config.notion_enabled());
        assert!(config
            .warnings()
            .iter()
            .any(|w| w.contains("NOTION_PARENT_PAGE_ID")));
    }
}
