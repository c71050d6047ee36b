// SQLite persistence for analyzed articles and run sessions.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{info, warn};

use factlens_common::{
    AnalysisSession, Article, Category, ClaimVerdict, Confidence, FactStatus, PageMetadata,
    Sentiment,
};

#[derive(Clone)]
pub struct ArticleStore {
    pool: SqlitePool,
}

/// A row from the articles table. JSON columns are decoded on conversion.
#[derive(Debug, Clone, sqlx::FromRow)]
struct StoredArticle {
    url: String,
    title: String,
    content: String,
    metadata: String,
    scrape_error: Option<String>,
    summary: String,
    claims: String,
    fact_check_results: String,
    overall_fact_status: String,
    classification: String,
    confidence: String,
    sentiment: String,
    credibility_score: f64,
    key_themes: String,
    analysis_notes: String,
    created_at: DateTime<Utc>,
}

impl From<StoredArticle> for Article {
    fn from(row: StoredArticle) -> Self {
        Article {
            metadata: decode_json::<PageMetadata>(&row.url, "metadata", &row.metadata),
            claims: decode_json::<Vec<String>>(&row.url, "claims", &row.claims),
            fact_check_results: decode_json::<Vec<ClaimVerdict>>(
                &row.url,
                "fact_check_results",
                &row.fact_check_results,
            ),
            key_themes: decode_json::<BTreeSet<String>>(&row.url, "key_themes", &row.key_themes),
            overall_fact_status: FactStatus::parse_lenient(&row.overall_fact_status),
            classification: Category::parse_lenient(&row.classification),
            confidence: Confidence::parse_lenient(&row.confidence),
            sentiment: Sentiment::parse_lenient(&row.sentiment),
            url: row.url,
            title: row.title,
            content: row.content,
            scrape_error: row.scrape_error,
            summary: row.summary,
            credibility_score: row.credibility_score,
            analysis_notes: row.analysis_notes,
            created_at: row.created_at,
        }
    }
}

fn decode_json<T: serde::de::DeserializeOwned + Default>(url: &str, column: &str, raw: &str) -> T {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(url, column, error = %e, "Corrupt JSON column, using empty value");
        T::default()
    })
}

/// Escape LIKE wildcards so a search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct StoredSession {
    id: i64,
    topic: String,
    articles_found: i64,
    facts_count: i64,
    myths_count: i64,
    unclear_count: i64,
    created_at: DateTime<Utc>,
}

impl From<StoredSession> for AnalysisSession {
    fn from(row: StoredSession) -> Self {
        AnalysisSession {
            id: Some(row.id),
            topic: row.topic,
            articles_found: row.articles_found,
            facts_count: row.facts_count,
            myths_count: row.myths_count,
            unclear_count: row.unclear_count,
            created_at: row.created_at,
        }
    }
}

/// Totals across everything stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatabaseStats {
    pub total_articles: i64,
    pub total_sessions: i64,
    pub by_classification: Vec<(String, i64)>,
    pub by_status: Vec<(String, i64)>,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Articles stored:  {}", self.total_articles)?;
        writeln!(f, "Analysis runs:    {}", self.total_sessions)?;
        writeln!(f, "\nBy classification:")?;
        for (name, count) in &self.by_classification {
            writeln!(f, "  {name:<26} {count}")?;
        }
        writeln!(f, "\nBy fact status:")?;
        for (name, count) in &self.by_status {
            writeln!(f, "  {name:<26} {count}")?;
        }
        Ok(())
    }
}

const ARTICLE_COLUMNS: &str = "url, title, content, metadata, scrape_error, summary, claims, \
     fact_check_results, overall_fact_status, classification, confidence, sentiment, \
     credibility_score, key_themes, analysis_notes, created_at";

impl ArticleStore {
    /// Open (creating if needed) the database at `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        // Every connection to `sqlite::memory:` is a separate database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to open database {database_url}"))?;

        info!(database_url, "Database connected");
        Ok(Self { pool })
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes. Idempotent.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL DEFAULT '',
                metadata TEXT NOT NULL DEFAULT '{}',
                scrape_error TEXT,
                summary TEXT NOT NULL DEFAULT '',
                claims TEXT NOT NULL DEFAULT '[]',
                fact_check_results TEXT NOT NULL DEFAULT '[]',
                overall_fact_status TEXT NOT NULL DEFAULT 'Unsure',
                classification TEXT NOT NULL DEFAULT 'Other',
                confidence TEXT NOT NULL DEFAULT 'low',
                sentiment TEXT NOT NULL DEFAULT 'neutral',
                credibility_score REAL NOT NULL DEFAULT 0.0,
                key_themes TEXT NOT NULL DEFAULT '[]',
                analysis_notes TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create articles table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS analysis_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                topic TEXT NOT NULL,
                articles_found INTEGER NOT NULL,
                facts_count INTEGER NOT NULL,
                myths_count INTEGER NOT NULL,
                unclear_count INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create analysis_sessions table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_created_at ON articles (created_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert or replace the row for `article.url`.
    pub async fn save_article(&self, article: &Article) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO articles
                (url, title, content, metadata, scrape_error, summary, claims,
                 fact_check_results, overall_fact_status, classification, confidence,
                 sentiment, credibility_score, key_themes, analysis_notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                metadata = excluded.metadata,
                scrape_error = excluded.scrape_error,
                summary = excluded.summary,
                claims = excluded.claims,
                fact_check_results = excluded.fact_check_results,
                overall_fact_status = excluded.overall_fact_status,
                classification = excluded.classification,
                confidence = excluded.confidence,
                sentiment = excluded.sentiment,
                credibility_score = excluded.credibility_score,
                key_themes = excluded.key_themes,
                analysis_notes = excluded.analysis_notes,
                created_at = excluded.created_at
            "#,
        )
        .bind(&article.url)
        .bind(&article.title)
        .bind(&article.content)
        .bind(serde_json::to_string(&article.metadata)?)
        .bind(&article.scrape_error)
        .bind(&article.summary)
        .bind(serde_json::to_string(&article.claims)?)
        .bind(serde_json::to_string(&article.fact_check_results)?)
        .bind(article.overall_fact_status.as_str())
        .bind(article.classification.as_str())
        .bind(article.confidence.as_str())
        .bind(article.sentiment.as_str())
        .bind(article.credibility_score)
        .bind(serde_json::to_string(&article.key_themes)?)
        .bind(&article.analysis_notes)
        .bind(article.created_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to save article {}", article.url))?;

        Ok(())
    }

    /// Save each article, logging and skipping failures. Returns how many were saved.
    pub async fn save_articles_batch(&self, articles: &[Article]) -> usize {
        let mut saved = 0;
        for article in articles {
            match self.save_article(article).await {
                Ok(()) => saved += 1,
                Err(e) => warn!(url = article.url.as_str(), error = %e, "Failed to save article"),
            }
        }
        info!(saved, total = articles.len(), "Articles saved");
        saved
    }

    /// Record one run's aggregate statistics. Returns the session id.
    pub async fn save_analysis_session(&self, topic: &str, articles: &[Article]) -> Result<i64> {
        let session = AnalysisSession::from_articles(topic, articles);

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO analysis_sessions
                (topic, articles_found, facts_count, myths_count, unclear_count, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&session.topic)
        .bind(session.articles_found)
        .bind(session.facts_count)
        .bind(session.myths_count)
        .bind(session.unclear_count)
        .bind(session.created_at)
        .fetch_one(&self.pool)
        .await
        .context("Failed to save analysis session")?;

        Ok(id)
    }

    pub async fn article_by_url(&self, url: &str) -> Result<Option<Article>> {
        let row = sqlx::query_as::<_, StoredArticle>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE url = ?"
        ))
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Article::from))
    }

    /// Most recently saved first.
    pub async fn recent_articles(&self, limit: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, StoredArticle>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// Articles whose url, title or summary contain `term`.
    pub async fn articles_by_topic(&self, term: &str) -> Result<Vec<Article>> {
        let pattern = format!("%{}%", escape_like(term));
        let rows = sqlx::query_as::<_, StoredArticle>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles \
             WHERE url LIKE ? ESCAPE '\\' OR title LIKE ? ESCAPE '\\' \
             OR summary LIKE ? ESCAPE '\\' \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// Most recent runs first.
    pub async fn analysis_sessions(&self, limit: i64) -> Result<Vec<AnalysisSession>> {
        let rows = sqlx::query_as::<_, StoredSession>(
            r#"
            SELECT id, topic, articles_found, facts_count, myths_count, unclear_count, created_at
            FROM analysis_sessions
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AnalysisSession::from).collect())
    }

    pub async fn database_stats(&self) -> Result<DatabaseStats> {
        let total_articles = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        let total_sessions = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM analysis_sessions")
            .fetch_one(&self.pool)
            .await?;

        let by_classification = sqlx::query_as::<_, (String, i64)>(
            "SELECT classification, COUNT(*) FROM articles \
             GROUP BY classification ORDER BY COUNT(*) DESC, classification",
        )
        .fetch_all(&self.pool)
        .await?;

        let by_status = sqlx::query_as::<_, (String, i64)>(
            "SELECT overall_fact_status, COUNT(*) FROM articles \
             GROUP BY overall_fact_status ORDER BY COUNT(*) DESC, overall_fact_status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(DatabaseStats {
            total_articles,
            total_sessions,
            by_classification,
            by_status,
        })
    }
}
