pub mod analysis;
pub mod fact_check;
pub mod scrape;
pub mod search;
pub mod summary;

use std::time::Duration;

pub use analysis::{analysis_summary, AnalysisAgent, AnalysisSummary, ANALYSIS_FALLBACK_NOTE};
pub use fact_check::{extract_claims, FactCheckAgent, MAX_CLAIMS};
pub use scrape::ScrapeAgent;
pub use search::SearchAgent;
pub use summary::{SummaryAgent, SUMMARY_FALLBACK};

/// Pauses between consecutive calls to the same remote service.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    pub between_fetches: Duration,
    pub between_summaries: Duration,
    pub between_claims: Duration,
    pub between_fact_checks: Duration,
    pub between_analyses: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            between_fetches: Duration::from_secs(1),
            between_summaries: Duration::from_millis(500),
            between_claims: Duration::from_millis(200),
            between_fact_checks: Duration::from_secs(1),
            between_analyses: Duration::from_millis(500),
        }
    }
}

impl Pacing {
    /// No pauses at all. For tests and replays against local mocks.
    pub fn none() -> Self {
        Self {
            between_fetches: Duration::ZERO,
            between_summaries: Duration::ZERO,
            between_claims: Duration::ZERO,
            between_fact_checks: Duration::ZERO,
            between_analyses: Duration::ZERO,
        }
    }
}

/// Sleep unless this was the last item of the batch.
pub(crate) async fn pause_between(index: usize, total: usize, delay: Duration) {
    if index + 1 < total && !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
