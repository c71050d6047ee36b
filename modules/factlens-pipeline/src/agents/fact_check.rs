use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use factlens_common::{overall_status, status_from_rating, Article, ClaimVerdict, Confidence};

use super::{pause_between, summary::SUMMARY_FALLBACK};
use crate::traits::ClaimSearcher;

pub const MAX_CLAIMS: usize = 5;

/// Sentences this short are fragments, not checkable claims.
const MIN_CLAIM_CHARS: usize = 20;

/// Split a summary into checkable claims.
///
/// Sentences longer than 20 characters, at most five. A summary with no such
/// sentence is checked as a single claim. Empty and fallback summaries have none.
pub fn extract_claims(summary: &str) -> Vec<String> {
    let summary = summary.trim();
    if summary.is_empty() || summary == SUMMARY_FALLBACK {
        return Vec::new();
    }

    let claims: Vec<String> = summary
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_CLAIM_CHARS)
        .take(MAX_CLAIMS)
        .map(str::to_string)
        .collect();

    if claims.is_empty() {
        vec![summary.to_string()]
    } else {
        claims
    }
}

/// Checks each article's claims against published fact-checks.
pub struct FactCheckAgent {
    searcher: Option<Arc<dyn ClaimSearcher>>,
    between_claims: Duration,
    between_articles: Duration,
}

impl FactCheckAgent {
    /// `searcher` is `None` when no fact-check key is configured.
    pub fn new(
        searcher: Option<Arc<dyn ClaimSearcher>>,
        between_claims: Duration,
        between_articles: Duration,
    ) -> Self {
        Self {
            searcher,
            between_claims,
            between_articles,
        }
    }

    pub async fn check_articles(&self, mut articles: Vec<Article>) -> Vec<Article> {
        let Some(searcher) = &self.searcher else {
            warn!("No fact-check API key configured, every article is Unsure");
            for article in articles.iter_mut() {
                article.claims.clear();
                article.fact_check_results.clear();
                article.overall_fact_status = overall_status(std::iter::empty());
            }
            return articles;
        };

        let total = articles.len();
        for (i, article) in articles.iter_mut().enumerate() {
            self.check_article(searcher.as_ref(), article).await;
            info!(
                url = article.url.as_str(),
                claims = article.claims.len(),
                status = %article.overall_fact_status,
                "Fact check complete"
            );
            if !article.claims.is_empty() {
                pause_between(i, total, self.between_articles).await;
            }
        }

        articles
    }

    async fn check_article(&self, searcher: &dyn ClaimSearcher, article: &mut Article) {
        let claims = extract_claims(&article.summary);
        let mut verdicts = Vec::with_capacity(claims.len());

        for (i, claim) in claims.iter().enumerate() {
            verdicts.push(check_claim(searcher, claim).await);
            pause_between(i, claims.len(), self.between_claims).await;
        }

        article.overall_fact_status = overall_status(verdicts.iter().map(|v| v.status));
        article.claims = claims;
        article.fact_check_results = verdicts;
    }
}

async fn check_claim(searcher: &dyn ClaimSearcher, claim: &str) -> ClaimVerdict {
    let response = match searcher.search_claims(claim).await {
        Ok(response) => response,
        Err(e) => {
            warn!(claim, error = %e, "Fact-check lookup failed");
            return ClaimVerdict::errored(claim);
        }
    };

    let Some(review) = response.first_review() else {
        debug!(claim, "No fact-check found");
        return ClaimVerdict::not_found(claim);
    };

    let rating = review
        .textual_rating
        .clone()
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    let publisher = review.publisher.as_ref();

    ClaimVerdict {
        claim: claim.to_string(),
        status: status_from_rating(&rating),
        rating,
        publisher: publisher
            .and_then(|p| p.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        publisher_site: publisher.and_then(|p| p.site.clone()).unwrap_or_default(),
        review_url: review.url.clone().unwrap_or_default(),
        review_date: review.review_date.clone().unwrap_or_default(),
        confidence: Confidence::High,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockClaimSearcher;
    use factlens_common::FactStatus;

    #[test]
    fn claims_are_sentences_over_twenty_chars() {
        let claims = extract_claims(
            "Seed companies patent engineered traits. Short one! Farmers may not replant patented seed?",
        );
        assert_eq!(
            claims,
            vec![
                "Seed companies patent engineered traits",
                "Farmers may not replant patented seed",
            ]
        );
    }

    #[test]
    fn at_most_five_claims() {
        let summary = "This is a sufficiently long sentence. ".repeat(8);
        assert_eq!(extract_claims(&summary).len(), MAX_CLAIMS);
    }

    #[test]
    fn short_summary_is_one_claim() {
        assert_eq!(extract_claims("GMOs are safe."), vec!["GMOs are safe."]);
    }

    #[test]
    fn empty_or_fallback_summary_has_no_claims() {
        assert!(extract_claims("   ").is_empty());
        assert!(extract_claims(SUMMARY_FALLBACK).is_empty());
    }

    #[tokio::test]
    async fn lookup_error_degrades_single_claim() {
        let searcher = MockClaimSearcher::new()
            .on_claim("Seed companies patent engineered traits", "True", "Checker")
            .failing_on("Farmers may not replant patented seed");
        let agent = FactCheckAgent::new(Some(Arc::new(searcher)), Duration::ZERO, Duration::ZERO);

        let mut article = Article::failed("https://a.example", "A", "unused");
        article.summary =
            "Seed companies patent engineered traits. Farmers may not replant patented seed."
                .into();
        let out = agent.check_articles(vec![article]).await;

        let results = &out[0].fact_check_results;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, FactStatus::Fact);
        assert_eq!(results[0].confidence, Confidence::High);
        assert_eq!(results[1].rating, "Error occurred");
        assert_eq!(results[1].status, FactStatus::Unsure);
        assert_eq!(out[0].overall_fact_status, FactStatus::Fact);
    }

    #[tokio::test]
    async fn unreviewed_claim_is_not_found() {
        let agent = FactCheckAgent::new(
            Some(Arc::new(MockClaimSearcher::new())),
            Duration::ZERO,
            Duration::ZERO,
        );
        let mut article = Article::failed("https://a.example", "A", "unused");
        article.summary = "A claim nobody has reviewed yet at all.".into();

        let out = agent.check_articles(vec![article]).await;
        let verdict = &out[0].fact_check_results[0];
        assert_eq!(verdict.rating, "No fact-check found");
        assert_eq!(verdict.publisher, "None");
        assert_eq!(verdict.confidence, Confidence::Low);
        assert_eq!(out[0].overall_fact_status, FactStatus::Unsure);
    }

    #[tokio::test]
    async fn review_without_rating_is_unknown() {
        let searcher = MockClaimSearcher::new()
            .on_unrated_claim("Terminator seeds were sold to farmers", "Checker");
        let agent = FactCheckAgent::new(Some(Arc::new(searcher)), Duration::ZERO, Duration::ZERO);
        let mut article = Article::failed("https://a.example", "A", "unused");
        article.summary = "Terminator seeds were sold to farmers.".into();

        let out = agent.check_articles(vec![article]).await;
        let verdict = &out[0].fact_check_results[0];
        assert_eq!(verdict.rating, "Unknown");
        assert_eq!(verdict.status, FactStatus::Unsure);
        assert_eq!(verdict.publisher, "Checker");
        assert_eq!(verdict.confidence, Confidence::High);
    }

    #[tokio::test]
    async fn missing_key_marks_everything_unsure() {
        let agent = FactCheckAgent::new(None, Duration::ZERO, Duration::ZERO);
        let mut article = Article::failed("https://a.example", "A", "unused");
        article.summary = "Seed companies patent engineered traits.".into();

        let out = agent.check_articles(vec![article]).await;
        assert!(out[0].claims.is_empty());
        assert_eq!(out[0].overall_fact_status, FactStatus::Unsure);
    }
}
