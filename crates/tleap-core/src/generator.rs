//! Question generation against a model service, filtered by history.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::error::GenerateError;
use crate::history::QuestionHistory;
use crate::model::QuestionRequest;
use crate::prompt::{build_prompt, DEFAULT_SYSTEM_PROMPT};
use crate::traits::{GenerateRequest, LlmProvider};

/// Sampling and model settings for the generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Maximum output length in tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Optional system prompt override.
    pub system_prompt_override: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "llama3".to_string(),
            max_tokens: 800,
            temperature: 0.8,
            system_prompt_override: None,
        }
    }
}

/// Generates questions and drops any line the history has already seen.
pub struct QuestionGenerator {
    provider: Arc<dyn LlmProvider>,
    config: GeneratorConfig,
}

impl QuestionGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, config: GeneratorConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Ask the model for questions and return the new ones, newline-joined.
    ///
    /// Every non-blank response line that is not yet in `history` is kept and
    /// recorded; the whole history is then saved. The model is called exactly
    /// once, so a response made only of known lines yields an empty string.
    /// If the model call fails the history file is left untouched.
    #[instrument(
        skip(self, request, history),
        fields(provider = self.provider.name(), model = %self.config.model)
    )]
    pub async fn generate(
        &self,
        request: &QuestionRequest,
        history: &mut QuestionHistory,
    ) -> Result<String, GenerateError> {
        let prompt = build_prompt(request);
        let llm_request = GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            system_prompt: Some(
                self.config
                    .system_prompt_override
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            ),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self.provider.generate(&llm_request).await?;
        debug!(
            latency_ms = response.latency_ms,
            completion_tokens = response.token_usage.completion_tokens,
            "model responded"
        );

        let mut unique = Vec::new();
        let mut repeated = 0usize;
        for line in response.content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if history.insert(line) {
                unique.push(line);
            } else {
                repeated += 1;
            }
        }

        history.save()?;

        if unique.len() != request.count as usize {
            debug!(
                requested = request.count,
                returned = unique.len(),
                "line count differs from requested question count"
            );
        }
        info!(
            new = unique.len(),
            repeated,
            history = history.len(),
            "filtered generated questions"
        );

        Ok(unique.join("\n"))
    }
}
