use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AiError, Result};
use crate::schema::StructuredOutput;
use crate::util::extract_json_block;

// =============================================================================
// LanguageModel Trait
// =============================================================================

/// A hosted text-generation model.
///
/// Implemented by [`crate::Gemini`]; pipeline stages depend on this trait so
/// tests can substitute canned responses.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Free-text completion for a single user prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Completion constrained to JSON matching `schema`. Returns the raw JSON text.
    async fn complete_json(&self, system: &str, prompt: &str, schema: Value) -> Result<String>;

    fn model(&self) -> &str;
}

// =============================================================================
// Structured extraction
// =============================================================================

/// Request `T` from the model and decode it strictly.
///
/// The provider is asked for schema-constrained JSON; the response is still
/// checked here because providers occasionally wrap it in prose or fences.
pub async fn extract<T: StructuredOutput>(
    llm: &dyn LanguageModel,
    system: &str,
    prompt: &str,
) -> Result<T> {
    let raw = llm.complete_json(system, prompt, T::gemini_schema()).await?;
    decode_structured(&raw)
}

/// Decode a structured response, tolerating code fences and surrounding prose.
pub fn decode_structured<T: StructuredOutput>(raw: &str) -> Result<T> {
    let json = extract_json_block(raw).ok_or_else(|| {
        AiError::Parse(format!("no JSON object in {} response", T::type_name()))
    })?;

    serde_json::from_str(json)
        .map_err(|e| AiError::Parse(format!("{} did not match schema: {e}", T::type_name())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema, PartialEq)]
    struct Verdict {
        label: String,
        score: f64,
    }

    struct Canned(&'static str);

    #[async_trait]
    impl LanguageModel for Canned {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        async fn complete_json(&self, _system: &str, _prompt: &str, schema: Value) -> Result<String> {
            assert_eq!(schema["type"], "OBJECT");
            Ok(self.0.to_string())
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    #[tokio::test]
    async fn extract_decodes_fenced_json() {
        let llm = Canned("```json\n{\"label\": \"ok\", \"score\": 0.5}\n```");
        let verdict: Verdict = extract(&llm, "sys", "prompt").await.unwrap();
        assert_eq!(
            verdict,
            Verdict {
                label: "ok".into(),
                score: 0.5
            }
        );
    }

    #[tokio::test]
    async fn extract_rejects_wrong_shape() {
        let llm = Canned("{\"label\": 7}");
        let err = extract::<Verdict>(&llm, "sys", "prompt").await.unwrap_err();
        assert!(matches!(err, AiError::Parse(_)));
    }

    #[test]
    fn decode_rejects_plain_text() {
        let err = decode_structured::<Verdict>("I cannot help with that").unwrap_err();
        assert!(err.to_string().contains("no JSON object"));
    }
}
