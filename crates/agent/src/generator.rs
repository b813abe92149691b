use std::sync::Arc;

use foodie_core::catalog::Catalog;
use foodie_core::responses::ResponseLibrary;
use foodie_core::text::normalize;
use thiserror::Error;
use tracing::debug;

use crate::intent::Intent;
use crate::llm::{CompletionRequest, GenerationParameters, LlmClient};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("generative client failed: {0}")]
    Client(String),
    #[error("generative client returned no usable text")]
    EmptyCompletion,
}

pub struct ResponseGenerator {
    catalog: Arc<Catalog>,
    responses: ResponseLibrary,
    llm: Arc<dyn LlmClient>,
    parameters: GenerationParameters,
}

impl ResponseGenerator {
    pub fn new(catalog: Arc<Catalog>, responses: ResponseLibrary, llm: Arc<dyn LlmClient>) -> Self {
        Self { catalog, responses, llm, parameters: GenerationParameters::default() }
    }

    pub fn responses(&self) -> &ResponseLibrary {
        &self.responses
    }

    /// Builds the reply for intents that need no I/O; `None` for `Freeform`.
    pub fn generate_local(&self, intent: &Intent) -> Option<String> {
        match intent {
            Intent::Welcome => Some(self.responses.welcome().to_string()),
            Intent::CategoryRecommendation { category } => {
                let lines = self.catalog.recommendations_for(category);
                Some(format!("Here are some {category} recommendations:\n{}", lines.join("\n")))
            }
            Intent::Freeform => None,
        }
    }

    pub async fn generate(&self, intent: &Intent, raw_input: &str) -> Result<String, GenerationError> {
        if let Some(reply) = self.generate_local(intent) {
            return Ok(reply);
        }

        let request = CompletionRequest::new(
            self.responses.persona_preamble(),
            raw_input,
            self.parameters.clone(),
        );
        let raw_reply = self
            .llm
            .complete(&request)
            .await
            .map_err(|error| GenerationError::Client(format!("{error:#}")))?;

        let reply = normalize(&raw_reply);
        if reply.is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }
        debug!(
            event_name = "generator.freeform.completed",
            raw_chars = raw_reply.chars().count(),
            reply_chars = reply.chars().count(),
            "freeform reply normalized"
        );
        Ok(reply)
    }
}
