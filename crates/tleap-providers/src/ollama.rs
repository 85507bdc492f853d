//! Ollama provider: a local model server speaking `/api/chat`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use tleap_core::error::ProviderError;
use tleap_core::prompt::DEFAULT_SYSTEM_PROMPT;
use tleap_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

// Generation on CPU-only machines can take minutes for 800 tokens.
const REQUEST_TIMEOUT_SECS: u64 = 300;

pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: SamplingOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct SamplingOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ReplyMessage,
    model: String,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<LocalModel>,
}

#[derive(Deserialize)]
struct LocalModel {
    name: String,
}

impl OllamaProvider {
    /// An empty `base_url` falls back to [`DEFAULT_BASE_URL`].
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        let base_url = match base_url.trim_end_matches('/') {
            "" => DEFAULT_BASE_URL,
            url => url,
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::NetworkError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }

    /// Fetch the models already pulled into this Ollama instance.
    pub async fn list_models_async(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        if !response.status().is_success() {
            return Err(ProviderError::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let tags: TagsResponse = response.json().await.map_err(|e| malformed("tags", e))?;
        Ok(tags
            .models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name.clone(),
                name: m.name,
                provider: "ollama".into(),
            })
            .collect())
    }

    fn send_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(REQUEST_TIMEOUT_SECS)
        } else if e.is_connect() {
            ProviderError::NetworkError(format!(
                "Ollama not reachable at {}. Is it running? Start with: ollama serve",
                self.base_url
            ))
        } else {
            ProviderError::NetworkError(e.to_string())
        }
    }
}

fn malformed(what: &str, e: reqwest::Error) -> ProviderError {
    ProviderError::ApiError {
        status: 0,
        message: format!("failed to parse {what} response: {e}"),
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        let started = Instant::now();
        let body = ChatRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request
                        .system_prompt
                        .as_deref()
                        .unwrap_or(DEFAULT_SYSTEM_PROMPT),
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            stream: false,
            options: SamplingOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        match response.status().as_u16() {
            404 => {
                return Err(ProviderError::ModelNotFound(format!(
                    "Model '{0}' not found locally. Pull it with: ollama pull {0}",
                    request.model
                )))
            }
            status if status >= 400 => {
                return Err(ProviderError::ApiError {
                    status,
                    message: response.text().await.unwrap_or_default(),
                })
            }
            _ => {}
        }

        let chat: ChatResponse = response.json().await.map_err(|e| malformed("chat", e))?;
        debug!(eval_count = chat.eval_count, "ollama chat completed");

        Ok(GenerateResponse {
            content: chat.message.content,
            model: chat.model,
            token_usage: TokenUsage {
                prompt_tokens: chat.prompt_eval_count,
                completion_tokens: chat.eval_count,
                total_tokens: chat.prompt_eval_count.saturating_add(chat.eval_count),
            },
            latency_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Always empty: pulled models are only known by asking the server,
    /// see [`OllamaProvider::list_models_async`].
    fn available_models(&self) -> Vec<ModelInfo> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(model: &str) -> GenerateRequest {
        GenerateRequest {
            model: model.into(),
            prompt: "Generate 2 MCQ questions in English for class 6 students.".into(),
            system_prompt: None,
            max_tokens: 800,
            temperature: 0.8,
        }
    }

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "message": {"role": "assistant", "content": "Q1: 2+2=?\nAnswer: 4"},
            "model": "llama3",
            "prompt_eval_count": 30,
            "eval_count": 15
        });

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3",
                "stream": false,
                "options": {"temperature": 0.8, "num_predict": 800}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&server.uri()).unwrap();
        let response = provider.generate(&request("llama3")).await.unwrap();
        assert_eq!(response.content, "Q1: 2+2=?\nAnswer: 4");
        assert_eq!(response.token_usage.prompt_tokens, 30);
        assert_eq!(response.token_usage.total_tokens, 45);
    }

    #[tokio::test]
    async fn model_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&server.uri()).unwrap();
        let err = provider.generate(&request("nonexistent")).await.unwrap_err();
        assert!(matches!(err, ProviderError::ModelNotFound(_)));
        assert!(err.to_string().contains("ollama pull nonexistent"));
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("out of memory"))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&server.uri()).unwrap();
        let err = provider.generate(&request("llama3")).await.unwrap_err();
        assert!(matches!(err, ProviderError::ApiError { status: 500, .. }));
        assert!(err.to_string().contains("out of memory"));
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        // Nothing listens on port 9 (discard) in the test environment.
        let provider = OllamaProvider::new("http://127.0.0.1:9").unwrap();
        let err = provider.generate(&request("llama3")).await.unwrap_err();
        assert!(matches!(err, ProviderError::NetworkError(_)));
    }

    #[tokio::test]
    async fn huge_token_counts_saturate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"role": "assistant", "content": "Q1"},
                "model": "llama3",
                "prompt_eval_count": u32::MAX,
                "eval_count": 10
            })))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&server.uri()).unwrap();
        let response = provider.generate(&request("llama3")).await.unwrap();
        assert_eq!(response.token_usage.total_tokens, u32::MAX);
        assert_eq!(response.token_usage.completion_tokens, 10);
    }

    #[tokio::test]
    async fn dynamic_model_listing() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "models": [
                {"name": "llama3:latest", "size": 4_700_000_000_u64},
                {"name": "gemma:2b", "size": 1_700_000_000_u64}
            ]
        });

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&server.uri()).unwrap();
        let models = provider.list_models_async().await.unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].id, "llama3:latest");
    }

    #[tokio::test]
    async fn tags_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&server.uri()).unwrap();
        let err = provider.list_models_async().await.unwrap_err();
        assert!(matches!(err, ProviderError::ApiError { status: 503, .. }));
    }

    #[test]
    fn base_url_is_normalized() {
        assert_eq!(OllamaProvider::new("").unwrap().base_url, DEFAULT_BASE_URL);
        assert_eq!(
            OllamaProvider::new("http://gpu-box:11434/").unwrap().base_url,
            "http://gpu-box:11434"
        );
    }
}
