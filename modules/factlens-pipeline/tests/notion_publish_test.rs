//! Notion publishing against a scripted API.
//!
//! - HTTP 429 is retried exactly once after the backoff
//! - Any other error is not retried
//! - A failed database creation skips every page
//! - Database selection honors NOTION_DATABASE_ID / NOTION_CREATE_DB_EACH_RUN

use std::sync::Arc;
use std::time::Duration;

use factlens_common::{Article, FactStatus, ScrapedPage, PageMetadata};
use factlens_pipeline::testing::{MockNotion, NotionOutcome};
use factlens_pipeline::{article_properties, NotionPublisher, NotionSettings};

fn settings() -> NotionSettings {
    NotionSettings {
        enabled: true,
        parent_page_id: Some("parent-page".into()),
        database_id: None,
        create_db_each_run: true,
    }
}

fn publisher(api: &Arc<MockNotion>, settings: NotionSettings) -> NotionPublisher {
    NotionPublisher::new(api.clone(), settings).with_backoff(Duration::ZERO)
}

fn article(url: &str) -> Article {
    Article::scraped(ScrapedPage {
        url: url.to_string(),
        title: "Seed patents explained".to_string(),
        content: "Body text about seed patents.".to_string(),
        metadata: PageMetadata::default(),
    })
}

// ---------------------------------------------------------------------------
// Rate limiting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rate_limited_page_succeeds_on_retry() {
    let api = Arc::new(MockNotion::new().then(NotionOutcome::RateLimited));
    let publisher = publisher(&api, settings());

    assert!(publisher.publish_article(&article("https://a.example"), "db-1").await);
    assert_eq!(api.page_attempts(), 2);
    assert_eq!(api.pages().len(), 1);
}

#[tokio::test]
async fn second_rate_limit_is_a_single_failure() {
    let api = Arc::new(
        MockNotion::new()
            .then(NotionOutcome::RateLimited)
            .then(NotionOutcome::RateLimited),
    );
    let publisher = publisher(&api, settings());

    assert!(!publisher.publish_article(&article("https://a.example"), "db-1").await);
    assert_eq!(api.page_attempts(), 2);
    assert!(api.pages().is_empty());
}

#[tokio::test]
async fn api_errors_are_not_retried() {
    let api = Arc::new(MockNotion::new().then(NotionOutcome::ApiError));
    let publisher = publisher(&api, settings());

    assert!(!publisher.publish_article(&article("https://a.example"), "db-1").await);
    assert_eq!(api.page_attempts(), 1);
}

#[tokio::test]
async fn one_failed_page_does_not_stop_the_rest() {
    // database ok, first page rejected, second page ok
    let api = Arc::new(
        MockNotion::new()
            .then(NotionOutcome::Ok)
            .then(NotionOutcome::ApiError),
    );
    let publisher = publisher(&api, settings());
    let articles = [article("https://a.example"), article("https://b.example")];

    let outcome = publisher.publish_run("seeds", &articles).await;
    assert_eq!(outcome.published, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.database_id.as_deref(), Some("db-1"));
}

// ---------------------------------------------------------------------------
// Database selection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_database_creation_skips_pages() {
    let api = Arc::new(MockNotion::new().then(NotionOutcome::ApiError));
    let publisher = publisher(&api, settings());

    let outcome = publisher
        .publish_run("seeds", &[article("https://a.example")])
        .await;
    assert!(outcome.database_id.is_none());
    assert_eq!(outcome.failed, 1);
    assert_eq!(api.page_attempts(), 0);
}

#[tokio::test]
async fn configured_database_is_reused_when_not_creating_per_run() {
    let api = Arc::new(MockNotion::new());
    let publisher = publisher(
        &api,
        NotionSettings {
            database_id: Some("existing-db".into()),
            create_db_each_run: false,
            ..settings()
        },
    );

    let outcome = publisher
        .publish_run("seeds", &[article("https://a.example")])
        .await;
    assert_eq!(outcome.database_id.as_deref(), Some("existing-db"));
    assert!(api.databases().is_empty());
    assert_eq!(api.pages()[0].0, "existing-db");
}

#[tokio::test]
async fn per_run_database_ignores_configured_id() {
    let api = Arc::new(MockNotion::new());
    let publisher = publisher(
        &api,
        NotionSettings {
            database_id: Some("existing-db".into()),
            ..settings()
        },
    );

    let id = publisher.resolve_database("seeds").await;
    assert_eq!(id.as_deref(), Some("db-1"));
    assert_eq!(api.databases(), vec!["Analysis Run: seeds".to_string()]);
}

#[test]
fn missing_parent_page_disables_publishing() {
    let api = Arc::new(MockNotion::new());
    let publisher = publisher(
        &api,
        NotionSettings {
            parent_page_id: None,
            ..settings()
        },
    );
    assert!(!publisher.is_enabled());
}

// ---------------------------------------------------------------------------
// Page properties
// ---------------------------------------------------------------------------

#[test]
fn page_properties_carry_the_analysis() {
    let mut a = article("https://a.example");
    a.summary = "Patents restrict replanting.".into();
    a.claims = vec!["Patents restrict replanting".into(), "Seeds are sterile".into()];
    a.overall_fact_status = FactStatus::Myth;
    a.credibility_score = 0.4;

    let props = article_properties(&a);
    assert_eq!(props["URL"]["url"], "https://a.example");
    assert_eq!(props["Fact Status"]["select"]["name"], "Myth");
    assert_eq!(
        props["Claims"]["rich_text"][0]["text"]["content"],
        "Patents restrict replanting, Seeds are sterile"
    );
    assert_eq!(props["Credibility"]["number"], 0.4);
}
