use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_mime_type: "text/plain".to_string(),
        }
    }
}

/// One prompt for the generative client: persona preamble plus user text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub role: String,
    pub system_preamble: String,
    pub user_text: String,
    pub parameters: GenerationParameters,
}

impl CompletionRequest {
    pub fn new(
        system_preamble: impl Into<String>,
        user_text: impl Into<String>,
        parameters: GenerationParameters,
    ) -> Self {
        Self {
            role: "user".to_string(),
            system_preamble: system_preamble.into(),
            user_text: user_text.into(),
            parameters,
        }
    }

    pub fn user_part(&self) -> String {
        format!("User input: {}", self.user_text)
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Stand-in used when no API key is configured; every call fails.
#[derive(Clone, Debug, Default)]
pub struct UnconfiguredLlmClient;

#[async_trait]
impl LlmClient for UnconfiguredLlmClient {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        anyhow::bail!("llm.api_key is not configured (set FOODIE_LLM_API_KEY)")
    }
}

#[cfg(test)]
mod tests {
    use super::{CompletionRequest, GenerationParameters, LlmClient, UnconfiguredLlmClient};

    #[test]
    fn default_parameters_match_assistant_tuning() {
        let parameters = GenerationParameters::default();
        assert_eq!(parameters.temperature, 1.0);
        assert_eq!(parameters.top_p, 0.95);
        assert_eq!(parameters.top_k, 40);
        assert_eq!(parameters.max_output_tokens, 8192);
        assert_eq!(parameters.response_mime_type, "text/plain");
    }

    #[test]
    fn request_prefixes_user_text() {
        let request =
            CompletionRequest::new("persona", "what's spicy?", GenerationParameters::default());
        assert_eq!(request.role, "user");
        assert_eq!(request.user_part(), "User input: what's spicy?");
    }

    #[tokio::test]
    async fn unconfigured_client_always_fails() {
        let request = CompletionRequest::new("persona", "hi", GenerationParameters::default());
        let error = UnconfiguredLlmClient.complete(&request).await.expect_err("no key configured");
        assert!(error.to_string().contains("llm.api_key"));
    }
}
