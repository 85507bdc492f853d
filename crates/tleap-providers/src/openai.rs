//! OpenAI-compatible chat completions provider.
//!
//! Works against OpenAI itself and against hosted services that expose the
//! same `/v1/chat/completions` shape, such as Groq.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use tleap_core::error::ProviderError;
use tleap_core::prompt::DEFAULT_SYSTEM_PROMPT;
use tleap_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai";

const REQUEST_TIMEOUT_SECS: u64 = 120;
/// Used when a 429 carries no usable `retry-after` header.
const FALLBACK_RETRY_AFTER_SECS: u64 = 5;

const GROQ_MODELS: &[(&str, &str)] = &[
    ("llama-3.1-8b-instant", "Llama 3.1 8B Instant"),
    ("llama-3.3-70b-versatile", "Llama 3.3 70B Versatile"),
];
const OPENAI_MODELS: &[(&str, &str)] = &[("gpt-4o-mini", "GPT-4o mini"), ("gpt-4.1", "GPT-4.1")];

pub struct OpenAiProvider {
    name: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<Usage> for TokenUsage {
    fn from(usage: Usage) -> Self {
        TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

impl OpenAiProvider {
    /// `base_url` defaults to OpenAI; pass [`GROQ_BASE_URL`] for Groq.
    pub fn new(name: &str, api_key: &str, base_url: Option<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::NetworkError(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            name: name.to_string(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

/// Map a non-success response to the matching [`ProviderError`].
async fn error_for_status(response: reqwest::Response, model: &str) -> ProviderError {
    match response.status() {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(FALLBACK_RETRY_AFTER_SECS);
            ProviderError::RateLimited {
                retry_after_ms: retry_after_secs.saturating_mul(1000),
            }
        }
        StatusCode::UNAUTHORIZED => {
            ProviderError::AuthenticationFailed(response.text().await.unwrap_or_default())
        }
        StatusCode::NOT_FOUND => ProviderError::ModelNotFound(model.to_string()),
        status => ProviderError::ApiError {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        },
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, request), fields(provider = %self.name, model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        let started = Instant::now();
        let body = CompletionRequest {
            model: &request.model,
            messages: [
                Message {
                    role: "system",
                    content: request
                        .system_prompt
                        .as_deref()
                        .unwrap_or(DEFAULT_SYSTEM_PROMPT),
                },
                Message {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(REQUEST_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(error_for_status(response, &request.model).await);
        }

        let completion: CompletionResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status: 0,
                message: format!("failed to parse completion response: {e}"),
            })?;
        debug!(choices = completion.choices.len(), "completion received");

        // A completion with no choices or a null message counts as empty text.
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(GenerateResponse {
            content,
            model: completion.model,
            token_usage: completion.usage.into(),
            latency_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Hosted catalogs are large; this returns a short curated list.
    fn available_models(&self) -> Vec<ModelInfo> {
        let known = if self.base_url.starts_with(GROQ_BASE_URL) {
            GROQ_MODELS
        } else {
            OPENAI_MODELS
        };
        known
            .iter()
            .map(|&(id, name)| ModelInfo {
                id: id.into(),
                name: name.into(),
                provider: self.name.clone(),
            })
            .collect()
    }
}
