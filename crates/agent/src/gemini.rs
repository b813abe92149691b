//! Gemini REST client for the freeform reply path.
//!
//! Talks to `models/{model}:generateContent`. Retries and the HTTP timeout
//! live here; the session only ever sees success or failure.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use foodie_core::config::LlmConfig;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::{CompletionRequest, LlmClient};

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("llm.api_key is not configured")]
    MissingApiKey,
    #[error("could not build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("gemini request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("gemini returned http {status}: {message}")]
    Http { status: u16, message: String },
    #[error("could not decode gemini response: {0}")]
    Decode(String),
    #[error("gemini returned no text in the response candidates")]
    EmptyResponse,
}

impl GeminiError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(error) => error.is_connect() || error.is_timeout(),
            Self::Http { status, .. } => {
                StatusCode::from_u16(*status).map(is_retryable_status).unwrap_or(false)
            }
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 2, base_delay_ms: 500, max_delay_ms: 8_000 }
    }
}

impl RetryPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    retry_policy: RetryPolicy,
}

impl GeminiClient {
    pub fn new(
        api_key: SecretString,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Result<Self, GeminiError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(GeminiError::MissingApiKey);
        }
        let client = Client::builder().timeout(timeout).build().map_err(GeminiError::ClientBuild)?;
        Ok(Self { client, api_key, base_url: base_url.into(), model: model.into(), retry_policy })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, GeminiError> {
        let api_key = config.api_key.clone().ok_or(GeminiError::MissingApiKey)?;
        Self::new(
            api_key,
            config.base_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
            RetryPolicy { max_retries: config.max_retries, ..RetryPolicy::default() },
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }

    async fn send_once(&self, body: &GenerateContentRequest) -> Result<String, GeminiError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(GeminiError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read gemini error body".to_string());
            return Err(GeminiError::Http {
                status: status.as_u16(),
                message: error_message(&body_text),
            });
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|error| GeminiError::Decode(error.to_string()))?;
        extract_text_response(parsed)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = GenerateContentRequest::from_completion(request);

        for attempt in 0..=self.retry_policy.max_retries {
            match self.send_once(&body).await {
                Ok(text) => {
                    debug!(
                        event_name = "llm.gemini.completed",
                        model = %self.model,
                        attempt,
                        response_chars = text.chars().count(),
                        "gemini completion received"
                    );
                    return Ok(text);
                }
                Err(error) if error.is_retryable() && attempt < self.retry_policy.max_retries => {
                    let delay = self.retry_policy.backoff(attempt);
                    warn!(
                        event_name = "llm.gemini.retrying",
                        model = %self.model,
                        attempt,
                        max_retries = self.retry_policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "gemini call failed; retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(GeminiError::EmptyResponse.into())
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .map(|wrapper| {
            let message = wrapper.error.message.unwrap_or_else(|| body.to_string());
            match wrapper.error.status {
                Some(status) if !status.is_empty() => format!("{status}: {message}"),
                _ => message,
            }
        })
        .unwrap_or_else(|| body.to_string())
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, GeminiError> {
    let text = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content.parts.into_iter().filter_map(|part| part.text).collect::<Vec<_>>().concat()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GeminiError::EmptyResponse);
    }
    Ok(text)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn from_completion(request: &CompletionRequest) -> Self {
        let parameters = &request.parameters;
        Self {
            contents: vec![Content {
                role: request.role.clone(),
                parts: vec![
                    Part { text: request.system_preamble.clone() },
                    Part { text: request.user_part() },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: parameters.temperature,
                top_p: parameters.top_p,
                top_k: parameters.top_k,
                max_output_tokens: parameters.max_output_tokens,
                response_mime_type: parameters.response_mime_type.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}
