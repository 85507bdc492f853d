//! tleap-providers - language-model provider integrations.
//!
//! Implements the `LlmProvider` trait for a local Ollama server and for
//! OpenAI-compatible chat APIs (OpenAI, Groq), plus a mock for tests.

pub mod config;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use config::{create_provider, load_config, ProviderConfig, TleapConfig};
pub use tleap_core::error::ProviderError;
