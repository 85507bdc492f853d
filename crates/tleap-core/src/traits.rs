//! The model-service boundary.
//!
//! `LlmProvider` is implemented by the `tleap-providers` crate; the question
//! generator only ever talks to a model through this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A language model reachable over some transport.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Config name of this provider, e.g. "ollama" or "groq".
    fn name(&self) -> &str;

    /// Send one prompt and wait for the full completion.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError>;

    /// Models known without a network round trip.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// One non-streaming completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    /// User message.
    pub prompt: String,
    /// System message; providers fall back to `DEFAULT_SYSTEM_PROMPT`.
    #[serde(default)]
    pub system_prompt: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Completion returned by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Raw completion text, unfiltered.
    pub content: String,
    /// Model name as reported by the service.
    pub model: String,
    pub token_usage: TokenUsage,
    /// Wall-clock time of the call.
    pub latency_ms: u64,
}

/// Token accounting reported by the provider, zero when unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A model a provider can serve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Identifier to pass as `--model`.
    pub id: String,
    pub name: String,
    pub provider: String,
}
