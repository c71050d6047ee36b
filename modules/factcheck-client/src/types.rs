use serde::{Deserialize, Serialize};

/// Response body of `claims:search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSearchResponse {
    #[serde(default)]
    pub claims: Vec<Claim>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl ClaimSearchResponse {
    /// The first review of the first matching claim, which is what the
    /// service ranks as most relevant.
    pub fn first_review(&self) -> Option<&ClaimReview> {
        self.claims.first()?.claim_review.first()
    }
}

/// A claim as indexed by the fact-check service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub claimant: Option<String>,
    #[serde(default)]
    pub claim_date: Option<String>,
    #[serde(default)]
    pub claim_review: Vec<ClaimReview>,
}

/// One publisher's review of a claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReview {
    #[serde(default)]
    pub publisher: Option<Publisher>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub review_date: Option<String>,
    /// Free-form verdict as written by the publisher ("False", "Mostly true", ...).
    #[serde(default)]
    pub textual_rating: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publisher {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
}
