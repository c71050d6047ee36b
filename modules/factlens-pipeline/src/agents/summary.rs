use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use ai_client::truncate_to_chars;
use factlens_common::Article;

use super::pause_between;
use crate::traits::LanguageModel;

pub const SUMMARY_FALLBACK: &str = "Summarization failed - unable to process content";

/// Content sent to the model is capped at this many characters.
const PROMPT_CONTENT_LIMIT: usize = 3000;

/// Produces a two-to-three sentence summary of each article.
pub struct SummaryAgent {
    llm: Option<Arc<dyn LanguageModel>>,
    delay: Duration,
}

impl SummaryAgent {
    /// `llm` is `None` when no model is configured; every article then gets
    /// the fallback summary.
    pub fn new(llm: Option<Arc<dyn LanguageModel>>, delay: Duration) -> Self {
        Self { llm, delay }
    }

    pub async fn summarize_articles(&self, mut articles: Vec<Article>) -> Vec<Article> {
        if self.llm.is_none() {
            warn!("No language model configured, using fallback summaries");
        }

        let total = articles.len();
        for (i, article) in articles.iter_mut().enumerate() {
            article.summary = self.summarize(article).await;
            if self.llm.is_some() && article.has_content() {
                pause_between(i, total, self.delay).await;
            }
        }

        let failed = articles
            .iter()
            .filter(|a| a.summary == SUMMARY_FALLBACK)
            .count();
        info!(total, failed, "Summarization complete");
        articles
    }

    async fn summarize(&self, article: &Article) -> String {
        let Some(llm) = &self.llm else {
            return SUMMARY_FALLBACK.to_string();
        };
        if !article.has_content() {
            return SUMMARY_FALLBACK.to_string();
        }

        match llm.complete(&summary_prompt(article)).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(url = article.url.as_str(), "Empty summary from model");
                SUMMARY_FALLBACK.to_string()
            }
            Err(e) => {
                warn!(url = article.url.as_str(), error = %e, "Summarization failed");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }
}

fn summary_prompt(article: &Article) -> String {
    let title = if article.title.is_empty() {
        "Untitled"
    } else {
        article.title.as_str()
    };
    let content = truncate_to_chars(&article.content, PROMPT_CONTENT_LIMIT);

    format!(
        "Please provide a concise summary of the following article content.\n\
         \n\
         Title: {title}\n\
         URL: {url}\n\
         Content: {content}\n\
         \n\
         Guidelines for the summary:\n\
         - Keep it concise (2-3 sentences maximum)\n\
         - Focus on the main points and key information\n\
         - Be objective and factual\n\
         - Avoid repetition and unnecessary details\n\
         - Maintain the core message of the article\n\
         \n\
         Provide only the summary text without any additional formatting or labels.",
        url = article.url,
    )
}
