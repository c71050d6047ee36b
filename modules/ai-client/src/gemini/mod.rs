mod client;
pub(crate) mod types;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::error::{AiError, Result};
use crate::traits::LanguageModel;

use client::{GeminiClient, GEMINI_API_URL};
use types::*;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Backoff before the single retry after an HTTP 429.
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(2);

// =============================================================================
// Gemini
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
    temperature: f32,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            temperature: 0.2,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    fn client(&self) -> GeminiClient {
        GeminiClient::new(
            &self.api_key,
            self.base_url.as_deref().unwrap_or(GEMINI_API_URL),
        )
    }

    /// Send a request, retrying once after a fixed backoff if rate limited.
    async fn send(&self, request: &GenerateContentRequest) -> Result<String> {
        let client = self.client();

        let response = match client.generate(&self.model, request).await {
            Err(AiError::RateLimited) => {
                warn!(model = %self.model, "Gemini rate limited, retrying once");
                tokio::time::sleep(RATE_LIMIT_BACKOFF).await;
                client.generate(&self.model, request).await?
            }
            other => other?,
        };

        if let Some(reason) = response.block_reason() {
            return Err(AiError::EmptyResponse(format!("prompt blocked: {reason}")));
        }

        response
            .text()
            .ok_or_else(|| AiError::EmptyResponse("no candidates from Gemini".into()))
    }
}

// =============================================================================
// LanguageModel Implementation
// =============================================================================

#[async_trait]
impl LanguageModel for Gemini {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest::user(prompt).config(GenerationConfig {
            temperature: Some(self.temperature),
            max_output_tokens: Some(1024),
            ..Default::default()
        });

        self.send(&request).await.map(|text| text.trim().to_string())
    }

    async fn complete_json(&self, system: &str, prompt: &str, schema: Value) -> Result<String> {
        let request = GenerateContentRequest::user(prompt)
            .system(system)
            .config(GenerationConfig {
                temperature: Some(0.0),
                max_output_tokens: Some(2048),
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema),
            });

        self.send(&request).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_new() {
        let ai = Gemini::new("g-test", DEFAULT_MODEL);
        assert_eq!(ai.model, "gemini-1.5-flash");
        assert_eq!(ai.api_key(), "g-test");
        assert_eq!(ai.base_url, None);
    }

    #[test]
    fn test_gemini_builders() {
        let ai = Gemini::new("g-test", DEFAULT_MODEL)
            .with_base_url("http://localhost:9999")
            .with_temperature(0.7);
        assert_eq!(ai.base_url.as_deref(), Some("http://localhost:9999"));
        assert!((ai.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let ai = Gemini::new("g-test", DEFAULT_MODEL).with_base_url("http://127.0.0.1:9");
        let err = ai.complete("hello").await.unwrap_err();
        assert!(matches!(err, AiError::Network(_)));
    }
}
