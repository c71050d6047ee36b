// Mirrors analyzed articles into a Notion database.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use factlens_common::{Article, Category, Config, FactStatus};
use notion_client::{database_url, schema, value, NotionClient, NotionError, Properties, SelectOption};

use crate::traits::NotionApi;

/// Notion rejects rich-text values longer than this.
const MAX_TEXT_CHARS: usize = 2000;
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(1);

const STATUS_OPTIONS: [&str; 3] = ["Fact", "Myth", "Unclear"];
const CONFIDENCE_OPTIONS: [&str; 3] = ["High", "Medium", "Low"];
const SENTIMENT_OPTIONS: [&str; 3] = ["Positive", "Neutral", "Negative"];

#[derive(Debug, Clone, Default)]
pub struct NotionSettings {
    pub enabled: bool,
    pub parent_page_id: Option<String>,
    pub database_id: Option<String>,
    pub create_db_each_run: bool,
}

impl NotionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.notion_enabled(),
            parent_page_id: config.notion_parent_page_id.clone(),
            database_id: config.notion_database_id.clone(),
            create_db_each_run: config.notion_create_db_each_run,
        }
    }
}

/// Result of publishing one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishOutcome {
    pub database_id: Option<String>,
    pub published: usize,
    pub failed: usize,
}

pub struct NotionPublisher {
    api: Arc<dyn NotionApi>,
    settings: NotionSettings,
    backoff: Duration,
}

impl NotionPublisher {
    pub fn new(api: Arc<dyn NotionApi>, settings: NotionSettings) -> Self {
        Self {
            api,
            settings,
            backoff: RATE_LIMIT_BACKOFF,
        }
    }

    /// Build from config. `None` when no token is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let token = config.notion_token.as_deref()?;
        Some(Self::new(
            Arc::new(NotionClient::new(token)),
            NotionSettings::from_config(config),
        ))
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Publishing flag set and both token and parent page present.
    pub fn is_enabled(&self) -> bool {
        self.settings.enabled && self.settings.parent_page_id.is_some()
    }

    /// Create a full-page database for one run under the parent page.
    pub async fn create_run_database(&self, run_name: &str) -> Option<String> {
        let Some(parent) = self.settings.parent_page_id.as_deref() else {
            warn!("Cannot create Notion database: NOTION_PARENT_PAGE_ID is missing");
            return None;
        };
        let title = format!("Analysis Run: {run_name}");

        let result = self
            .with_retry("create database", || {
                self.api
                    .create_database(parent, &title, database_properties())
            })
            .await;

        match result {
            Ok(database) => {
                info!(title = title.as_str(), url = %database_url(&database.id), "Created Notion database");
                Some(database.id)
            }
            Err(e) => {
                warn!(error = %e, "Failed to create Notion database");
                None
            }
        }
    }

    /// Insert one article as a page. Returns whether it landed.
    pub async fn publish_article(&self, article: &Article, database_id: &str) -> bool {
        let result = self
            .with_retry("publish article", || {
                self.api.create_page(database_id, article_properties(article))
            })
            .await;

        match result {
            Ok(_) => {
                info!(url = article.url.as_str(), "Published to Notion");
                true
            }
            Err(e) => {
                warn!(url = article.url.as_str(), error = %e, "Failed to publish to Notion");
                false
            }
        }
    }

    /// Database for this run: a fresh one per run, or the configured id, or
    /// a fresh one when no id is configured.
    pub async fn resolve_database(&self, run_name: &str) -> Option<String> {
        if !self.settings.create_db_each_run {
            if let Some(id) = &self.settings.database_id {
                return Some(id.clone());
            }
        }
        self.create_run_database(run_name).await
    }

    /// Publish every article, continuing past failures.
    pub async fn publish_run(&self, run_name: &str, articles: &[Article]) -> PublishOutcome {
        let Some(database_id) = self.resolve_database(run_name).await else {
            return PublishOutcome {
                failed: articles.len(),
                ..Default::default()
            };
        };

        let mut outcome = PublishOutcome {
            database_id: Some(database_id.clone()),
            ..Default::default()
        };
        for article in articles {
            if self.publish_article(article, &database_id).await {
                outcome.published += 1;
            } else {
                outcome.failed += 1;
            }
        }

        info!(
            published = outcome.published,
            failed = outcome.failed,
            url = %database_url(&database_id),
            "Notion publishing complete"
        );
        outcome
    }

    /// Run `op`; on HTTP 429 wait and run it exactly once more.
    async fn with_retry<T, F, Fut>(&self, what: &str, op: F) -> notion_client::Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = notion_client::Result<T>>,
    {
        match op().await {
            Err(NotionError::RateLimited { retry_after_secs }) => {
                warn!(what, ?retry_after_secs, "Rate limited by Notion, retrying once");
                if !self.backoff.is_zero() {
                    tokio::time::sleep(self.backoff).await;
                }
                op().await
            }
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Property mapping
// ---------------------------------------------------------------------------

fn database_properties() -> Properties {
    let status_colors = ["green", "red", "yellow"];
    let category_colors = [
        "blue", "green", "orange", "red", "purple", "pink", "brown", "gray", "default",
    ];

    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();

    let mut props = Properties::new();
    props.insert("Title".into(), schema::title());
    props.insert("URL".into(), schema::url());
    props.insert("Content".into(), schema::rich_text());
    props.insert("Summary".into(), schema::rich_text());
    props.insert("Claims".into(), schema::rich_text());
    props.insert(
        "Fact Status".into(),
        schema::select(&options(&STATUS_OPTIONS, &status_colors)),
    );
    props.insert(
        "Classification".into(),
        schema::select(&options(&categories, &category_colors)),
    );
    props.insert(
        "Confidence".into(),
        schema::select(&options(&CONFIDENCE_OPTIONS, &["green", "yellow", "red"])),
    );
    props.insert(
        "Sentiment".into(),
        schema::select(&options(&SENTIMENT_OPTIONS, &["green", "gray", "red"])),
    );
    props.insert("Credibility".into(), schema::number());
    props.insert("Analysis Date".into(), schema::date());
    props
}

fn options(names: &[&str], colors: &[&str]) -> Vec<SelectOption> {
    names
        .iter()
        .zip(colors)
        .map(|(name, color)| SelectOption::new(name, color))
        .collect()
}

/// Page properties for one article. Empty rich-text fields are omitted.
pub fn article_properties(article: &Article) -> Properties {
    let status = match article.overall_fact_status {
        FactStatus::Unsure => "Unclear",
        other => other.as_str(),
    };
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();

    let title = if article.title.trim().is_empty() {
        "Untitled"
    } else {
        article.title.as_str()
    };

    let mut props = Properties::new();
    props.insert("Title".into(), value::title(&truncate_chars(title)));
    props.insert("URL".into(), value::url(&article.url));

    let rich = [
        ("Content", article.content.clone()),
        ("Summary", article.summary.clone()),
        ("Claims", article.claims.join(", ")),
    ];
    for (name, text) in rich {
        let text = truncate_chars(&text);
        if !text.trim().is_empty() {
            props.insert(name.into(), value::rich_text(&text));
        }
    }

    props.insert(
        "Fact Status".into(),
        value::select(select_option(status, &STATUS_OPTIONS, "Unclear")),
    );
    props.insert(
        "Classification".into(),
        value::select(select_option(
            article.classification.as_str(),
            &categories,
            "Other",
        )),
    );
    props.insert(
        "Confidence".into(),
        value::select(select_option(
            article.confidence.as_str(),
            &CONFIDENCE_OPTIONS,
            "Medium",
        )),
    );
    props.insert(
        "Sentiment".into(),
        value::select(select_option(
            article.sentiment.as_str(),
            &SENTIMENT_OPTIONS,
            "Neutral",
        )),
    );
    props.insert("Credibility".into(), value::number(article.credibility_score));
    props.insert(
        "Analysis Date".into(),
        value::date(&Utc::now().format("%Y-%m-%d").to_string()),
    );
    props
}

/// Case-insensitive match against a select's option list.
fn select_option<'a>(raw: &str, options: &[&'a str], default: &'a str) -> &'a str {
    let raw = raw.trim();
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(raw))
        .copied()
        .unwrap_or(default)
}

fn truncate_chars(text: &str) -> String {
    text.chars().take(MAX_TEXT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use factlens_common::Confidence;

    #[test]
    fn unsure_maps_to_unclear_option() {
        let article = Article::failed("https://a.example", "A", "e");
        let props = article_properties(&article);
        assert_eq!(props["Fact Status"]["select"]["name"], "Unclear");
        assert_eq!(props["Classification"]["select"]["name"], "Other");
    }

    #[test]
    fn confidence_is_capitalized_for_notion() {
        let mut article = Article::failed("https://a.example", "A", "e");
        article.confidence = Confidence::High;
        let props = article_properties(&article);
        assert_eq!(props["Confidence"]["select"]["name"], "High");
    }

    #[test]
    fn empty_rich_text_is_omitted_and_long_text_truncated() {
        let mut article = Article::failed("https://a.example", "", "e");
        article.summary = "s".repeat(5000);
        let props = article_properties(&article);

        assert!(!props.contains_key("Content"));
        assert!(!props.contains_key("Claims"));
        let summary = props["Summary"]["rich_text"][0]["text"]["content"].as_str().unwrap();
        assert_eq!(summary.chars().count(), MAX_TEXT_CHARS);
        assert_eq!(props["Title"]["title"][0]["text"]["content"], "Untitled");
    }

    #[test]
    fn select_validation_falls_back_to_default() {
        assert_eq!(select_option("myth", &STATUS_OPTIONS, "Unclear"), "Myth");
        assert_eq!(select_option("maybe", &STATUS_OPTIONS, "Unclear"), "Unclear");
    }

    #[test]
    fn database_schema_has_every_column() {
        let props = database_properties();
        for key in [
            "Title",
            "URL",
            "Content",
            "Summary",
            "Claims",
            "Fact Status",
            "Classification",
            "Confidence",
            "Sentiment",
            "Credibility",
            "Analysis Date",
        ] {
            assert!(props.contains_key(key), "missing {key}");
        }
        let options = props["Classification"]["select"]["options"].as_array().unwrap();
        assert_eq!(options.len(), 9);
    }
}
