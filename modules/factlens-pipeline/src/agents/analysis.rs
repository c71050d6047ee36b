use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ai_client::extract;
use factlens_common::{
    clamp_credibility, Article, Category, Confidence, FactStatus, Sentiment,
};

use super::{pause_between, summary::SUMMARY_FALLBACK};
use crate::traits::LanguageModel;

pub const ANALYSIS_FALLBACK_NOTE: &str = "Analysis failed due to processing error";

const SYSTEM_PROMPT: &str = "You classify news articles about genetically modified seeds \
and crops. Be objective and analytical. Respond only with JSON matching the schema.";

/// What the model is asked to return for one article.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalysisResponse {
    /// Exactly one of the listed categories
    pub classification: String,
    /// One of: high, medium, low
    pub confidence: String,
    /// Short theme labels, at most five
    #[serde(default)]
    pub key_themes: Vec<String>,
    /// One of: positive, neutral, negative
    pub sentiment: String,
    /// Credibility between 0.0 and 1.0
    pub credibility_score: f64,
    /// One or two sentences on how the verdict was reached
    #[serde(default)]
    pub analysis_notes: String,
}

/// Classification outcome after normalization into the fixed taxonomy.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub classification: Category,
    pub confidence: Confidence,
    pub sentiment: Sentiment,
    pub credibility_score: f64,
    pub key_themes: BTreeSet<String>,
    pub analysis_notes: String,
}

impl Analysis {
    pub fn fallback() -> Self {
        Self {
            classification: Category::Other,
            confidence: Confidence::Low,
            sentiment: Sentiment::Neutral,
            credibility_score: 0.0,
            key_themes: BTreeSet::new(),
            analysis_notes: ANALYSIS_FALLBACK_NOTE.to_string(),
        }
    }

    fn apply(self, article: &mut Article) {
        article.classification = self.classification;
        article.confidence = self.confidence;
        article.sentiment = self.sentiment;
        article.credibility_score = self.credibility_score;
        article.key_themes = self.key_themes;
        article.analysis_notes = self.analysis_notes;
    }
}

impl From<AnalysisResponse> for Analysis {
    fn from(r: AnalysisResponse) -> Self {
        Self {
            classification: Category::parse_lenient(&r.classification),
            confidence: Confidence::parse_lenient(&r.confidence),
            sentiment: Sentiment::parse_lenient(&r.sentiment),
            credibility_score: clamp_credibility(r.credibility_score),
            key_themes: r
                .key_themes
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            analysis_notes: r.analysis_notes.trim().to_string(),
        }
    }
}

/// Classifies each article and scores its credibility.
pub struct AnalysisAgent {
    llm: Option<Arc<dyn LanguageModel>>,
    delay: Duration,
}

impl AnalysisAgent {
    pub fn new(llm: Option<Arc<dyn LanguageModel>>, delay: Duration) -> Self {
        Self { llm, delay }
    }

    pub async fn analyze_articles(&self, mut articles: Vec<Article>) -> Vec<Article> {
        let total = articles.len();
        for (i, article) in articles.iter_mut().enumerate() {
            let called_model = self.llm.is_some() && has_material(article);
            self.analyze(article).await.apply(article);
            if called_model {
                pause_between(i, total, self.delay).await;
            }
        }

        let failed = articles
            .iter()
            .filter(|a| a.analysis_notes == ANALYSIS_FALLBACK_NOTE)
            .count();
        info!(total, failed, "Analysis complete");
        articles
    }

    async fn analyze(&self, article: &Article) -> Analysis {
        let Some(llm) = &self.llm else {
            return Analysis::fallback();
        };
        if !has_material(article) {
            return Analysis::fallback();
        }

        match extract::<AnalysisResponse>(llm.as_ref(), SYSTEM_PROMPT, &analysis_prompt(article))
            .await
        {
            Ok(response) => response.into(),
            Err(e) => {
                warn!(url = article.url.as_str(), error = %e, "Analysis failed");
                Analysis::fallback()
            }
        }
    }
}

/// An article with neither a real summary nor content gives the model nothing to classify.
fn has_material(article: &Article) -> bool {
    let summary = article.summary.trim();
    (!summary.is_empty() && summary != SUMMARY_FALLBACK) || article.has_content()
}

fn analysis_prompt(article: &Article) -> String {
    let categories = Category::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let verdicts = if article.fact_check_results.is_empty() {
        "No claims were fact-checked.".to_string()
    } else {
        article
            .fact_check_results
            .iter()
            .map(|v| format!("- \"{}\": {} ({}, rated \"{}\" by {})", v.claim, v.status, v.confidence, v.rating, v.publisher))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Analyze the following article.\n\
         \n\
         Title: {title}\n\
         URL: {url}\n\
         Summary: {summary}\n\
         \n\
         Fact-check results:\n\
         {verdicts}\n\
         Overall fact status: {status}\n\
         \n\
         Classify the article into exactly one of these categories: {categories}.\n\
         Give your confidence (high, medium, low), up to five key themes, the overall \
         sentiment (positive, neutral, negative), a credibility score between 0.0 and 1.0 \
         that takes the fact-check results into account, and brief analysis notes.",
        title = article.title,
        url = article.url,
        summary = article.summary,
        status = article.overall_fact_status,
    )
}

// ---------------------------------------------------------------------------
// Run-level summary
// ---------------------------------------------------------------------------

/// Counts over one run's analyzed articles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub total_articles: usize,
    pub successful_analyses: usize,
    pub by_classification: BTreeMap<Category, usize>,
    pub by_status: BTreeMap<FactStatus, usize>,
    pub by_confidence: BTreeMap<Confidence, usize>,
}

/// Tally classifications (all nine always present), statuses and confidences.
pub fn analysis_summary(articles: &[Article]) -> AnalysisSummary {
    let mut summary = AnalysisSummary {
        total_articles: articles.len(),
        by_classification: Category::ALL.iter().map(|c| (*c, 0)).collect(),
        ..Default::default()
    };

    for article in articles {
        *summary
            .by_classification
            .entry(article.classification)
            .or_default() += 1;
        *summary.by_status.entry(article.overall_fact_status).or_default() += 1;
        *summary.by_confidence.entry(article.confidence).or_default() += 1;
        if article.analysis_notes != ANALYSIS_FALLBACK_NOTE {
            summary.successful_analyses += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLlm;
    use ai_client::StructuredOutput;

    fn summarized(summary: &str) -> Article {
        let mut article = Article::failed("https://a.example/x", "X", "unused");
        article.summary = summary.to_string();
        article
    }

    #[test]
    fn response_schema_is_gemini_shaped() {
        let schema = AnalysisResponse::gemini_schema();
        assert_eq!(schema["type"], "OBJECT");
        let props = schema["properties"].as_object().unwrap();
        for key in [
            "classification",
            "confidence",
            "key_themes",
            "sentiment",
            "credibility_score",
            "analysis_notes",
        ] {
            assert!(props.contains_key(key), "missing {key}");
        }
        assert_eq!(props["key_themes"]["type"], "ARRAY");
    }

    #[test]
    fn normalization_fixes_out_of_range_values() {
        let analysis: Analysis = AnalysisResponse {
            classification: "corporate CONTROL".into(),
            confidence: "very high".into(),
            key_themes: vec![" patents ".into(), "".into(), "patents".into(), "seed".into()],
            sentiment: "Negative".into(),
            credibility_score: 3.5,
            analysis_notes: " ok ".into(),
        }
        .into();

        assert_eq!(analysis.classification, Category::CorporateControl);
        assert_eq!(analysis.confidence, Confidence::Low);
        assert_eq!(analysis.sentiment, Sentiment::Negative);
        assert_eq!(analysis.credibility_score, 1.0);
        assert_eq!(analysis.key_themes.len(), 2);
        assert_eq!(analysis.analysis_notes, "ok");
    }

    #[tokio::test]
    async fn structured_response_is_applied() {
        let llm = MockLlm::new().on_json(
            r#"{"classification": "Health", "confidence": "high", "key_themes": ["allergens"],
                "sentiment": "neutral", "credibility_score": 0.8, "analysis_notes": "Well sourced"}"#,
        );
        let agent = AnalysisAgent::new(Some(Arc::new(llm)), Duration::ZERO);

        let out = agent
            .analyze_articles(vec![summarized("GM foods are tested for allergens.")])
            .await;
        assert_eq!(out[0].classification, Category::Health);
        assert_eq!(out[0].confidence, Confidence::High);
        assert_eq!(out[0].credibility_score, 0.8);
        assert!(out[0].key_themes.contains("allergens"));
    }

    #[tokio::test]
    async fn malformed_response_falls_back() {
        let llm = MockLlm::new().on_json("I think it is about health.");
        let agent = AnalysisAgent::new(Some(Arc::new(llm)), Duration::ZERO);

        let out = agent
            .analyze_articles(vec![summarized("GM foods are tested for allergens.")])
            .await;
        assert_eq!(out[0].classification, Category::Other);
        assert_eq!(out[0].sentiment, Sentiment::Neutral);
        assert_eq!(out[0].credibility_score, 0.0);
        assert_eq!(out[0].analysis_notes, ANALYSIS_FALLBACK_NOTE);
    }

    #[tokio::test]
    async fn nothing_to_classify_skips_the_model() {
        let llm = Arc::new(MockLlm::new().on_json("{}"));
        let agent = AnalysisAgent::new(Some(llm.clone()), Duration::ZERO);

        let out = agent.analyze_articles(vec![summarized(SUMMARY_FALLBACK)]).await;
        assert_eq!(out[0].analysis_notes, ANALYSIS_FALLBACK_NOTE);
        assert_eq!(llm.json_calls(), 0);
    }

    #[test]
    fn summary_lists_every_category() {
        let mut a = summarized("x");
        a.classification = Category::Health;
        a.analysis_notes = "fine".into();
        let mut b = summarized("y");
        b.analysis_notes = ANALYSIS_FALLBACK_NOTE.into();

        let summary = analysis_summary(&[a, b]);
        assert_eq!(summary.total_articles, 2);
        assert_eq!(summary.successful_analyses, 1);
        assert_eq!(summary.by_classification.len(), 9);
        assert_eq!(summary.by_classification[&Category::Health], 1);
        assert_eq!(summary.by_classification[&Category::Other], 1);
        assert_eq!(summary.by_status[&FactStatus::Unsure], 2);
    }
}
