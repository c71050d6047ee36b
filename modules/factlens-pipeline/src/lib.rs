pub mod agents;
pub mod notion;
pub mod pipeline;
pub mod stage_files;
pub mod store;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use agents::{analysis_summary, AnalysisSummary, Pacing};
pub use notion::{article_properties, NotionPublisher, NotionSettings, PublishOutcome};
pub use pipeline::{Pipeline, PipelineDeps, RunReport, MAX_RESULTS_LIMIT};
pub use stage_files::{Stage, StageFiles};
pub use store::{ArticleStore, DatabaseStats};
pub use traits::{ClaimSearcher, NotionApi};
