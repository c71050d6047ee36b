use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Enums ---

/// Fact-check outcome for a claim, and the reduction of those outcomes for an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FactStatus {
    Fact,
    Myth,
    #[serde(alias = "Unclear")]
    Unsure,
}

impl FactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactStatus::Fact => "Fact",
            FactStatus::Myth => "Myth",
            FactStatus::Unsure => "Unsure",
        }
    }

    /// Lenient parse used when reading stored rows. Anything unrecognised is Unsure.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "fact" => FactStatus::Fact,
            "myth" => FactStatus::Myth,
            _ => FactStatus::Unsure,
        }
    }
}

impl fmt::Display for FactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed classification taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Health,
    Environmental,
    #[serde(rename = "Social economics")]
    SocialEconomics,
    #[serde(rename = "Conspiracy theory")]
    ConspiracyTheory,
    #[serde(rename = "Corporate control")]
    CorporateControl,
    #[serde(rename = "Ethical/religious issues")]
    EthicalReligious,
    #[serde(rename = "Seed ownership")]
    SeedOwnership,
    #[serde(rename = "Scientific authority")]
    ScientificAuthority,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Health,
        Category::Environmental,
        Category::SocialEconomics,
        Category::ConspiracyTheory,
        Category::CorporateControl,
        Category::EthicalReligious,
        Category::SeedOwnership,
        Category::ScientificAuthority,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Health => "Health",
            Category::Environmental => "Environmental",
            Category::SocialEconomics => "Social economics",
            Category::ConspiracyTheory => "Conspiracy theory",
            Category::CorporateControl => "Corporate control",
            Category::EthicalReligious => "Ethical/religious issues",
            Category::SeedOwnership => "Seed ownership",
            Category::ScientificAuthority => "Scientific authority",
            Category::Other => "Other",
        }
    }

    /// Case-insensitive match against the taxonomy; anything else is Other.
    pub fn parse_lenient(s: &str) -> Self {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub const ALL: [Confidence; 3] = [Confidence::High, Confidence::Medium, Confidence::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }

    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp a model-reported credibility score into [0, 1]. NaN becomes 0.
pub fn clamp_credibility(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

// --- Search / scrape ---

/// A web search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// Metadata lifted from a page's `<head>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub published: Option<String>,
}

/// A fetched page, already reduced to readable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub url: String,
    pub title: String,
    pub content: String,
    pub metadata: PageMetadata,
}

// --- Claims ---

/// Fact-check outcome for one claim. Owned by its article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimVerdict {
    pub claim: String,
    pub status: FactStatus,
    pub rating: String,
    pub publisher: String,
    pub publisher_site: String,
    pub review_url: String,
    pub review_date: String,
    pub confidence: Confidence,
}

impl ClaimVerdict {
    /// Verdict for a claim the fact-check service has no review for.
    pub fn not_found(claim: &str) -> Self {
        Self::unsure(claim, "No fact-check found")
    }

    /// Verdict for a claim whose lookup failed.
    pub fn errored(claim: &str) -> Self {
        Self::unsure(claim, "Error occurred")
    }

    fn unsure(claim: &str, rating: &str) -> Self {
        Self {
            claim: claim.to_string(),
            status: FactStatus::Unsure,
            rating: rating.to_string(),
            publisher: "None".to_string(),
            publisher_site: String::new(),
            review_url: String::new(),
            review_date: String::new(),
            confidence: Confidence::Low,
        }
    }
}

// --- Article ---

/// One article as it moves through the pipeline. Each stage fills in its own
/// field group; the final value is persisted and not mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub metadata: PageMetadata,
    /// Why the fetch produced no content, when it didn't.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_error: Option<String>,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub claims: Vec<String>,
    #[serde(default)]
    pub fact_check_results: Vec<ClaimVerdict>,
    pub overall_fact_status: FactStatus,

    pub classification: Category,
    pub confidence: Confidence,
    pub sentiment: Sentiment,
    pub credibility_score: f64,
    #[serde(default)]
    pub key_themes: BTreeSet<String>,
    #[serde(default)]
    pub analysis_notes: String,

    pub created_at: DateTime<Utc>,
}

impl Article {
    /// A freshly scraped article. Downstream fields start at their neutral defaults.
    pub fn scraped(page: ScrapedPage) -> Self {
        Self {
            url: page.url,
            title: page.title,
            content: page.content,
            metadata: page.metadata,
            scrape_error: None,
            ..Self::blank()
        }
    }

    /// Placeholder record for a URL that could not be scraped.
    pub fn failed(url: &str, title: &str, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            scrape_error: Some(error.into()),
            ..Self::blank()
        }
    }

    fn blank() -> Self {
        Self {
            url: String::new(),
            title: String::new(),
            content: String::new(),
            metadata: PageMetadata::default(),
            scrape_error: None,
            summary: String::new(),
            claims: Vec::new(),
            fact_check_results: Vec::new(),
            overall_fact_status: FactStatus::Unsure,
            classification: Category::Other,
            confidence: Confidence::Low,
            sentiment: Sentiment::Neutral,
            credibility_score: 0.0,
            key_themes: BTreeSet::new(),
            analysis_notes: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

// --- Session ---

/// One row per pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSession {
    pub id: Option<i64>,
    pub topic: String,
    pub articles_found: i64,
    pub facts_count: i64,
    pub myths_count: i64,
    pub unclear_count: i64,
    pub created_at: DateTime<Utc>,
}

impl AnalysisSession {
    /// Aggregate the statuses of a run's articles.
    pub fn from_articles(topic: &str, articles: &[Article]) -> Self {
        let count = |status: FactStatus| {
            articles
                .iter()
                .filter(|a| a.overall_fact_status == status)
                .count() as i64
        };

        Self {
            id: None,
            topic: topic.to_string(),
            articles_found: articles.len() as i64,
            facts_count: count(FactStatus::Fact),
            myths_count: count(FactStatus::Myth),
            unclear_count: count(FactStatus::Unsure),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_strings_round_trip_through_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            let back: Category = serde_json::from_str(&json).unwrap();
            assert_eq!(back, category);
        }
    }

    #[test]
    fn category_parse_is_case_insensitive_with_other_fallback() {
        assert_eq!(Category::parse_lenient("seed OWNERSHIP"), Category::SeedOwnership);
        assert_eq!(
            Category::parse_lenient(" Ethical/religious issues "),
            Category::EthicalReligious
        );
        assert_eq!(Category::parse_lenient("Sports"), Category::Other);
        assert_eq!(Category::parse_lenient(""), Category::Other);
    }

    #[test]
    fn category_strings_are_never_empty() {
        assert!(Category::ALL.iter().all(|c| !c.as_str().is_empty()));
        assert_eq!(Category::ALL.len(), 9);
    }

    #[test]
    fn legacy_unclear_status_deserializes_as_unsure() {
        let status: FactStatus = serde_json::from_str("\"Unclear\"").unwrap();
        assert_eq!(status, FactStatus::Unsure);
        assert_eq!(FactStatus::parse_lenient("unclear"), FactStatus::Unsure);
        assert_eq!(FactStatus::parse_lenient("MYTH"), FactStatus::Myth);
    }

    #[test]
    fn lenient_confidence_and_sentiment() {
        assert_eq!(Confidence::parse_lenient("High"), Confidence::High);
        assert_eq!(Confidence::parse_lenient("certain"), Confidence::Low);
        assert_eq!(Sentiment::parse_lenient("NEGATIVE"), Sentiment::Negative);
        assert_eq!(Sentiment::parse_lenient("mixed"), Sentiment::Neutral);
    }

    #[test]
    fn credibility_is_clamped() {
        assert_eq!(clamp_credibility(1.7), 1.0);
        assert_eq!(clamp_credibility(-0.2), 0.0);
        assert_eq!(clamp_credibility(0.42), 0.42);
        assert_eq!(clamp_credibility(f64::NAN), 0.0);
    }

    #[test]
    fn failed_article_has_empty_content_and_note() {
        let article = Article::failed("https://example.org/x", "X", "HTTP 404");
        assert!(!article.has_content());
        assert_eq!(article.scrape_error.as_deref(), Some("HTTP 404"));
        assert_eq!(article.overall_fact_status, FactStatus::Unsure);
        assert_eq!(article.classification, Category::Other);
    }

    #[test]
    fn session_counts_statuses() {
        let mut a = Article::failed("https://a", "a", "e");
        a.overall_fact_status = FactStatus::Fact;
        let mut b = Article::failed("https://b", "b", "e");
        b.overall_fact_status = FactStatus::Myth;
        let c = Article::failed("https://c", "c", "e");

        let session = AnalysisSession::from_articles("seeds", &[a, b, c]);
        assert_eq!(session.articles_found, 3);
        assert_eq!(session.facts_count, 1);
        assert_eq!(session.myths_count, 1);
        assert_eq!(session.unclear_count, 1);
        assert_eq!(session.topic, "seeds");
    }
}
