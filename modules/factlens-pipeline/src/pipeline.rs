// Search → scrape → summarize → fact-check → classify → persist → publish.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use ai_client::Gemini;
use factcheck_client::FactCheckClient;
use factlens_archive::{HttpPageFetcher, SerperSearch};
use factlens_common::{Article, Config, FactStatus};
use notion_client::database_url;

use crate::agents::{
    analysis_summary, AnalysisAgent, AnalysisSummary, FactCheckAgent, Pacing, ScrapeAgent,
    SearchAgent, SummaryAgent, ANALYSIS_FALLBACK_NOTE, SUMMARY_FALLBACK,
};
use crate::notion::NotionPublisher;
use crate::stage_files::{Stage, StageFiles};
use crate::store::ArticleStore;
use crate::traits::{ClaimSearcher, LanguageModel, PageFetcher, WebSearcher};

pub const MAX_RESULTS_LIMIT: usize = 20;

/// Everything a pipeline needs, already constructed.
pub struct PipelineDeps {
    pub searcher: Option<Arc<dyn WebSearcher>>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub llm: Option<Arc<dyn LanguageModel>>,
    pub claims: Option<Arc<dyn ClaimSearcher>>,
    pub notion: Option<NotionPublisher>,
    pub store: ArticleStore,
    pub stage_dir: PathBuf,
    pub pacing: Pacing,
    pub max_content_length: usize,
}

pub struct Pipeline {
    search: Option<SearchAgent>,
    scrape: ScrapeAgent,
    summary: SummaryAgent,
    fact_check: FactCheckAgent,
    analysis: AnalysisAgent,
    notion: Option<NotionPublisher>,
    store: ArticleStore,
    stage_files: StageFiles,
}

impl Pipeline {
    pub fn new(deps: PipelineDeps) -> Self {
        let pacing = deps.pacing;
        Self {
            search: deps.searcher.map(SearchAgent::new),
            scrape: ScrapeAgent::new(deps.fetcher, deps.max_content_length, pacing.between_fetches),
            summary: SummaryAgent::new(deps.llm.clone(), pacing.between_summaries),
            fact_check: FactCheckAgent::new(
                deps.claims,
                pacing.between_claims,
                pacing.between_fact_checks,
            ),
            analysis: AnalysisAgent::new(deps.llm, pacing.between_analyses),
            notion: deps.notion,
            store: deps.store,
            stage_files: StageFiles::new(deps.stage_dir),
        }
    }

    /// Wire real clients from configuration. Missing keys disable their stage.
    pub fn from_config(config: &Config, store: ArticleStore) -> Self {
        let searcher = config
            .serper_api_key
            .as_deref()
            .map(|key| Arc::new(SerperSearch::new(key)) as Arc<dyn WebSearcher>);
        let llm = config.google_api_key.as_deref().map(|key| {
            Arc::new(Gemini::new(key, config.gemini_model.as_str())) as Arc<dyn LanguageModel>
        });
        let claims = config
            .fact_check_api_key
            .as_deref()
            .map(|key| Arc::new(FactCheckClient::new(key)) as Arc<dyn ClaimSearcher>);

        Self::new(PipelineDeps {
            searcher,
            fetcher: Arc::new(HttpPageFetcher::new()),
            llm,
            claims,
            notion: NotionPublisher::from_config(config),
            store,
            stage_dir: config.temp_dir.clone(),
            pacing: Pacing::default(),
            max_content_length: config.max_content_length,
        })
    }

    /// Analyze one topic end to end. Failures degrade individual records,
    /// never the run.
    pub async fn run(&self, topic: &str, max_results: usize) -> RunReport {
        let max_results = max_results.clamp(1, MAX_RESULTS_LIMIT);
        let mut report = RunReport::new(topic);
        info!(topic, max_results, "Run starting");

        // --- Search ---
        let Some(search) = &self.search else {
            warn!("No search API key configured, nothing to analyze");
            return report;
        };
        let urls = search.search(topic, max_results).await;
        report.urls_found = urls.len();
        if urls.is_empty() {
            warn!(topic, "No articles found");
            return report;
        }

        // --- Scrape ---
        let articles = self.scrape.scrape_urls(&urls).await;
        report.scrape_failures = articles.iter().filter(|a| a.scrape_error.is_some()).count();
        self.snapshot(&mut report, Stage::Scraped, &articles);

        // --- Summarize ---
        let articles = self.summary.summarize_articles(articles).await;
        report.summary_failures = articles
            .iter()
            .filter(|a| a.summary == SUMMARY_FALLBACK)
            .count();
        self.snapshot(&mut report, Stage::Summarized, &articles);

        // --- Fact-check ---
        let articles = self.fact_check.check_articles(articles).await;
        report.fact_check_errors = articles
            .iter()
            .flat_map(|a| &a.fact_check_results)
            .filter(|v| v.rating == "Error occurred")
            .count();
        self.snapshot(&mut report, Stage::FactChecked, &articles);

        // --- Classify ---
        let articles = self.analysis.analyze_articles(articles).await;
        report.analysis_failures = articles
            .iter()
            .filter(|a| a.analysis_notes == ANALYSIS_FALLBACK_NOTE)
            .count();
        self.snapshot(&mut report, Stage::Analyzed, &articles);

        // --- Persist ---
        report.saved = self.store.save_articles_batch(&articles).await;
        report.session_id = match self.store.save_analysis_session(topic, &articles).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "Failed to save analysis session");
                None
            }
        };

        // --- Publish ---
        if let Some(notion) = self.notion.as_ref().filter(|n| n.is_enabled()) {
            let run_name = format!("{topic} - {}", chrono::Utc::now().format("%Y-%m-%d %H:%M"));
            let outcome = notion.publish_run(&run_name, &articles).await;
            report.published = outcome.published;
            report.notion_database_id = outcome.database_id;
        }

        report.summary = analysis_summary(&articles);
        report.articles = articles;
        info!(topic, articles = report.articles.len(), "Run complete");
        report
    }

    fn snapshot(&self, report: &mut RunReport, stage: Stage, articles: &[Article]) {
        if let Some(path) = self.stage_files.record(stage, articles) {
            report.stage_files.push(path);
        }
    }
}

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// Outcome of one run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub topic: String,
    pub urls_found: usize,
    pub scrape_failures: usize,
    pub summary_failures: usize,
    pub fact_check_errors: usize,
    pub analysis_failures: usize,
    pub saved: usize,
    pub session_id: Option<i64>,
    pub published: usize,
    pub notion_database_id: Option<String>,
    pub stage_files: Vec<PathBuf>,
    pub summary: AnalysisSummary,
    pub articles: Vec<Article>,
}

impl RunReport {
    fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            ..Default::default()
        }
    }

    pub fn count_status(&self, status: FactStatus) -> usize {
        self.articles
            .iter()
            .filter(|a| a.overall_fact_status == status)
            .count()
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Analysis Run Complete: {} ===", self.topic)?;
        writeln!(f, "URLs found:         {}", self.urls_found)?;
        writeln!(f, "Articles analyzed:  {}", self.articles.len())?;
        writeln!(f, "Scrape failures:    {}", self.scrape_failures)?;
        writeln!(f, "Summary fallbacks:  {}", self.summary_failures)?;
        writeln!(f, "Fact-check errors:  {}", self.fact_check_errors)?;
        writeln!(f, "Analysis fallbacks: {}", self.analysis_failures)?;
        writeln!(f, "Saved to database:  {}", self.saved)?;
        if let Some(id) = self.session_id {
            writeln!(f, "Session id:         {id}")?;
        }

        writeln!(f, "\nFact status:")?;
        writeln!(f, "  Fact:   {}", self.count_status(FactStatus::Fact))?;
        writeln!(f, "  Myth:   {}", self.count_status(FactStatus::Myth))?;
        writeln!(f, "  Unsure: {}", self.count_status(FactStatus::Unsure))?;

        let used: Vec<_> = self
            .summary
            .by_classification
            .iter()
            .filter(|(_, n)| **n > 0)
            .collect();
        if !used.is_empty() {
            writeln!(f, "\nClassification:")?;
            for (category, n) in used {
                writeln!(f, "  {:<26} {n}", category.as_str())?;
            }
        }

        if !self.articles.is_empty() {
            writeln!(f, "\nArticles:")?;
            for article in &self.articles {
                writeln!(
                    f,
                    "  [{}] {} ({}, credibility {:.2})",
                    article.overall_fact_status,
                    article.title,
                    article.classification,
                    article.credibility_score
                )?;
                writeln!(f, "      {}", article.url)?;
            }
        }

        if let Some(id) = &self.notion_database_id {
            writeln!(f, "\nNotion: {} pages at {}", self.published, database_url(id))?;
        }
        for path in &self.stage_files {
            writeln!(f, "Stage file: {}", path.display())?;
        }
        Ok(())
    }
}
