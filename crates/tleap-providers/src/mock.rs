//! In-process provider with canned replies, for tests and offline runs.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use tleap_core::error::ProviderError;
use tleap_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage};

/// Replies with the first rule whose key occurs in the prompt, else the
/// fallback text. Rules are checked in insertion order.
#[derive(Default)]
pub struct MockProvider {
    rules: Vec<(String, String)>,
    fallback: String,
    calls: AtomicU32,
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that answers every prompt with `reply`.
    pub fn with_fixed_response(reply: &str) -> Self {
        Self::new().otherwise(reply)
    }

    /// Reply with `reply` when the prompt contains `needle`.
    pub fn when_prompt_contains(mut self, needle: &str, reply: &str) -> Self {
        self.rules.push((needle.to_string(), reply.to_string()));
        self
    }

    /// Reply used when no rule matches. Empty unless set.
    pub fn otherwise(mut self, reply: &str) -> Self {
        self.fallback = reply.to_string();
        self
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        let content = self
            .rules
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
            .map_or(&self.fallback, |(_, reply)| reply)
            .clone();

        // Whitespace-separated words stand in for tokens.
        let prompt_tokens = request.prompt.split_whitespace().count() as u32;
        let completion_tokens = content.split_whitespace().count() as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens.saturating_add(completion_tokens),
            },
            latency_ms: 0,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Canned replies".into(),
            provider: "mock".into(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tleap_core::{Difficulty, GeneratorConfig, QuestionGenerator, QuestionHistory, QuestionRequest};

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "mock".into(),
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("Q1: 2+2=4");
        let response = provider.generate(&request("anything")).await.unwrap();
        assert_eq!(response.content, "Q1: 2+2=4");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request().unwrap().prompt, "anything");
    }

    #[tokio::test]
    async fn prompt_matching() {
        let provider = MockProvider::new()
            .when_prompt_contains("Fractions", "Q: 1/2 + 1/2 = ?")
            .when_prompt_contains("Force", "Q: SI unit of force?");

        let resp = provider
            .generate(&request("Topic: Fractions"))
            .await
            .unwrap();
        assert!(resp.content.contains("1/2"));

        let resp = provider.generate(&request("Topic: Force")).await.unwrap();
        assert!(resp.content.contains("force"));

        let resp = provider.generate(&request("Topic: Poetry")).await.unwrap();
        assert_eq!(resp.content, "");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn first_matching_rule_wins() {
        let provider = MockProvider::new()
            .when_prompt_contains("Topic", "first")
            .when_prompt_contains("Topic: Force", "second")
            .otherwise("none");

        let resp = provider.generate(&request("Topic: Force")).await.unwrap();
        assert_eq!(resp.content, "first");
        assert_eq!(resp.token_usage.prompt_tokens, 2);
    }

    #[tokio::test]
    async fn drives_the_question_generator() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = QuestionHistory::new(dir.path().join("history.json"));
        history.insert("Q1: 2+2=4");

        let provider = Arc::new(MockProvider::with_fixed_response("Q1: 2+2=4\nQ2: 3+3=6"));
        let generator = QuestionGenerator::new(provider.clone(), GeneratorConfig::default());

        let request = QuestionRequest {
            class_level: "10".into(),
            subject: "Mathematics".into(),
            topic: "Addition".into(),
            difficulty: Difficulty::Easy,
            question_type: "MCQ".into(),
            language: "English".into(),
            count: 2,
        };
        let out = generator.generate(&request, &mut history).await.unwrap();

        assert_eq!(out, "Q2: 3+3=6");
        assert_eq!(provider.call_count(), 1);
        assert!(provider
            .last_request()
            .unwrap()
            .prompt
            .contains("Topic: Addition"));
    }
}
