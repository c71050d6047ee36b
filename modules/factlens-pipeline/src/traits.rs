// Seams for the remote services the pipeline calls.
//
// WebSearcher and PageFetcher live in factlens-archive, LanguageModel in
// ai-client. ClaimSearcher and NotionApi wrap the two REST clients so the
// stages can run against MockClaimSearcher / MockNotion in tests.

use async_trait::async_trait;

use factcheck_client::{ClaimSearchResponse, FactCheckClient};
use notion_client::{Database, NotionClient, Page, Properties};

pub use ai_client::LanguageModel;
pub use factlens_archive::{PageFetcher, WebSearcher};

// ---------------------------------------------------------------------------
// ClaimSearcher
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ClaimSearcher: Send + Sync {
    /// Look up published fact-checks for a claim.
    async fn search_claims(&self, claim: &str) -> factcheck_client::Result<ClaimSearchResponse>;
}

#[async_trait]
impl ClaimSearcher for FactCheckClient {
    async fn search_claims(&self, claim: &str) -> factcheck_client::Result<ClaimSearchResponse> {
        FactCheckClient::search_claims(self, claim).await
    }
}

// ---------------------------------------------------------------------------
// NotionApi
// ---------------------------------------------------------------------------

#[async_trait]
pub trait NotionApi: Send + Sync {
    async fn create_database(
        &self,
        parent_page_id: &str,
        title: &str,
        properties: Properties,
    ) -> notion_client::Result<Database>;

    async fn create_page(
        &self,
        database_id: &str,
        properties: Properties,
    ) -> notion_client::Result<Page>;
}

#[async_trait]
impl NotionApi for NotionClient {
    async fn create_database(
        &self,
        parent_page_id: &str,
        title: &str,
        properties: Properties,
    ) -> notion_client::Result<Database> {
        NotionClient::create_database(self, parent_page_id, title, properties).await
    }

    async fn create_page(
        &self,
        database_id: &str,
        properties: Properties,
    ) -> notion_client::Result<Page> {
        NotionClient::create_page(self, database_id, properties).await
    }
}
