// Test mocks for the pipeline.
//
// - MockLlm (LanguageModel): canned completion / JSON text
// - MockClaimSearcher (ClaimSearcher): HashMap-based claim→review
// - MockNotion (NotionApi): scripted outcomes, records every call
//
// MockSearcher and MockPageFetcher come from factlens-archive.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use ai_client::AiError;
use factcheck_client::{Claim, ClaimReview, ClaimSearchResponse, FactCheckError, Publisher};
use notion_client::{Database, NotionError, Page, Properties};

use crate::traits::{ClaimSearcher, LanguageModel, NotionApi};

pub use factlens_archive::testing::{MockPageFetcher, MockSearcher};

// ---------------------------------------------------------------------------
// MockLlm
// ---------------------------------------------------------------------------

/// Returns the same text for every call. Builder: `.on_complete()`,
/// `.on_json()`, `.failing()`.
pub struct MockLlm {
    completion: String,
    json: String,
    fail: bool,
    complete_calls: AtomicUsize,
    json_calls: AtomicUsize,
}

impl MockLlm {
    pub fn new() -> Self {
        Self {
            completion: String::new(),
            json: String::new(),
            fail: false,
            complete_calls: AtomicUsize::new(0),
            json_calls: AtomicUsize::new(0),
        }
    }

    pub fn on_complete(mut self, text: &str) -> Self {
        self.completion = text.to_string();
        self
    }

    pub fn on_json(mut self, text: &str) -> Self {
        self.json = text.to_string();
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    pub fn json_calls(&self) -> usize {
        self.json_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockLlm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageModel for MockLlm {
    async fn complete(&self, _prompt: &str) -> ai_client::Result<String> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AiError::Network("mock outage".into()));
        }
        Ok(self.completion.clone())
    }

    async fn complete_json(
        &self,
        _system: &str,
        _prompt: &str,
        _schema: Value,
    ) -> ai_client::Result<String> {
        self.json_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AiError::Network("mock outage".into()));
        }
        Ok(self.json.clone())
    }

    fn model(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// MockClaimSearcher
// ---------------------------------------------------------------------------

/// Claim text → single review. Unknown claims return no reviews; claims
/// registered with `.failing_on()` return a network error.
pub struct MockClaimSearcher {
    reviews: HashMap<String, ClaimReview>,
    failing: HashSet<String>,
    queries: Mutex<Vec<String>>,
}

impl MockClaimSearcher {
    pub fn new() -> Self {
        Self {
            reviews: HashMap::new(),
            failing: HashSet::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn on_claim(mut self, claim: &str, rating: &str, publisher: &str) -> Self {
        self.reviews.insert(
            claim.to_string(),
            ClaimReview {
                publisher: Some(Publisher {
                    name: Some(publisher.to_string()),
                    site: Some(format!("{}.example", publisher.to_lowercase())),
                }),
                url: Some(format!("https://checks.example/{}", self.reviews.len())),
                title: None,
                review_date: Some("2024-01-01T00:00:00Z".to_string()),
                textual_rating: Some(rating.to_string()),
                language_code: Some("en".to_string()),
            },
        );
        self
    }

    /// A review whose publisher gave no textual rating.
    pub fn on_unrated_claim(mut self, claim: &str, publisher: &str) -> Self {
        self = self.on_claim(claim, "", publisher);
        if let Some(review) = self.reviews.get_mut(claim) {
            review.textual_rating = None;
        }
        self
    }

    pub fn failing_on(mut self, claim: &str) -> Self {
        self.failing.insert(claim.to_string());
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockClaimSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClaimSearcher for MockClaimSearcher {
    async fn search_claims(&self, claim: &str) -> factcheck_client::Result<ClaimSearchResponse> {
        self.queries.lock().unwrap().push(claim.to_string());

        if self.failing.contains(claim) {
            return Err(FactCheckError::Network("mock timeout".into()));
        }

        let claims = match self.reviews.get(claim) {
            Some(review) => vec![Claim {
                text: claim.to_string(),
                claimant: None,
                claim_date: None,
                claim_review: vec![review.clone()],
            }],
            None => Vec::new(),
        };

        Ok(ClaimSearchResponse {
            claims,
            next_page_token: None,
        })
    }
}

// ---------------------------------------------------------------------------
// MockNotion
// ---------------------------------------------------------------------------

/// Scripted outcome for one Notion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotionOutcome {
    Ok,
    RateLimited,
    ApiError,
}

impl NotionOutcome {
    fn into_result<T>(self, ok: T) -> notion_client::Result<T> {
        match self {
            NotionOutcome::Ok => Ok(ok),
            NotionOutcome::RateLimited => Err(NotionError::RateLimited {
                retry_after_secs: None,
            }),
            NotionOutcome::ApiError => Err(NotionError::Api {
                status: 400,
                code: "validation_error".into(),
                message: "mock validation error".into(),
            }),
        }
    }
}

/// Plays back queued outcomes in call order, then succeeds.
pub struct MockNotion {
    outcomes: Mutex<VecDeque<NotionOutcome>>,
    databases: Mutex<Vec<String>>,
    pages: Mutex<Vec<(String, Properties)>>,
    page_attempts: AtomicUsize,
}

impl MockNotion {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            databases: Mutex::new(Vec::new()),
            pages: Mutex::new(Vec::new()),
            page_attempts: AtomicUsize::new(0),
        }
    }

    /// Queue outcomes consumed by successive calls (database or page).
    pub fn then(self, outcome: NotionOutcome) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }

    /// Titles of databases created.
    pub fn databases(&self) -> Vec<String> {
        self.databases.lock().unwrap().clone()
    }

    /// Pages that were accepted, with their database id.
    pub fn pages(&self) -> Vec<(String, Properties)> {
        self.pages.lock().unwrap().clone()
    }

    /// Every page call, including rejected ones.
    pub fn page_attempts(&self) -> usize {
        self.page_attempts.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> NotionOutcome {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(NotionOutcome::Ok)
    }
}

impl Default for MockNotion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotionApi for MockNotion {
    async fn create_database(
        &self,
        _parent_page_id: &str,
        title: &str,
        _properties: Properties,
    ) -> notion_client::Result<Database> {
        let outcome = self.next_outcome();
        let mut databases = self.databases.lock().unwrap();
        let database = Database {
            id: format!("db-{}", databases.len() + 1),
            url: None,
        };
        let result = outcome.into_result(database);
        if result.is_ok() {
            databases.push(title.to_string());
        }
        result
    }

    async fn create_page(
        &self,
        database_id: &str,
        properties: Properties,
    ) -> notion_client::Result<Page> {
        self.page_attempts.fetch_add(1, Ordering::SeqCst);
        let outcome = self.next_outcome();
        let mut pages = self.pages.lock().unwrap();
        let page = Page {
            id: format!("page-{}", pages.len() + 1),
            url: None,
        };
        let result = outcome.into_result(page);
        if result.is_ok() {
            pages.push((database_id.to_string(), properties));
        }
        result
    }
}
