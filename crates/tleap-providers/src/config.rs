//! Configuration loading and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tleap_core::analysis::DEFAULT_ANALYSIS_FILE;
use tleap_core::history::DEFAULT_HISTORY_FILE;
use tleap_core::traits::LlmProvider;
use tleap_core::GeneratorConfig;

use crate::ollama::{self, OllamaProvider};
use crate::openai::{OpenAiProvider, GROQ_BASE_URL};

/// Configuration for a single model provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
    /// Any OpenAI-compatible chat completions API (OpenAI, Groq).
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    ollama::DEFAULT_BASE_URL.to_string()
}

/// Top-level tleap configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TleapConfig {
    /// Provider configurations keyed by name.
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used when none is given on the command line.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model used when none is given on the command line.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature for question generation.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum output length in tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Where the question history JSON lives.
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    /// Where analysis rows are appended.
    #[serde(default = "default_analysis_path")]
    pub analysis_path: PathBuf,
}

fn default_providers() -> HashMap<String, ProviderConfig> {
    HashMap::from([(
        "ollama".to_string(),
        ProviderConfig::Ollama {
            base_url: default_ollama_url(),
        },
    )])
}
fn default_provider() -> String {
    "ollama".to_string()
}
fn default_model() -> String {
    "llama3".to_string()
}
fn default_temperature() -> f64 {
    0.8
}
fn default_max_tokens() -> u32 {
    800
}
fn default_history_path() -> PathBuf {
    PathBuf::from(DEFAULT_HISTORY_FILE)
}
fn default_analysis_path() -> PathBuf {
    PathBuf::from(DEFAULT_ANALYSIS_FILE)
}

impl Default for TleapConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            history_path: default_history_path(),
            analysis_path: default_analysis_path(),
        }
    }
}

impl TleapConfig {
    /// Generator settings derived from this config.
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            model: self.default_model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system_prompt_override: None,
        }
    }
}

/// Expand `${VAR}` references from the process environment. Unset variables
/// expand to nothing; an unterminated `${` is left as is.
fn resolve_env_vars(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&std::env::var(&rest[start + 2..start + 2 + len]).unwrap_or_default());
        rest = &rest[start + 3 + len..];
    }
    out.push_str(rest);
    out
}

impl ProviderConfig {
    fn expand_env_vars(&mut self) {
        match self {
            ProviderConfig::Ollama { base_url } => *base_url = resolve_env_vars(base_url),
            ProviderConfig::OpenAI { api_key, base_url } => {
                *api_key = resolve_env_vars(api_key);
                if let Some(url) = base_url {
                    *url = resolve_env_vars(url);
                }
            }
        }
    }
}

/// Inject API keys from the environment.
///
/// `GROQ_API_KEY` configures a `groq` provider against Groq's OpenAI-compatible
/// endpoint; `TLEAP_OPENAI_KEY` configures `openai`. Keys override any value
/// already present in the file.
fn apply_env_overrides(config: &mut TleapConfig, lookup: impl Fn(&str) -> Option<String>) {
    let overrides = [
        ("GROQ_API_KEY", "groq", Some(GROQ_BASE_URL)),
        ("TLEAP_OPENAI_KEY", "openai", None),
    ];

    for (var, name, base_url) in overrides {
        let Some(key) = lookup(var) else {
            continue;
        };
        let entry = config
            .providers
            .entry(name.to_string())
            .or_insert_with(|| ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: base_url.map(str::to_string),
            });
        if let ProviderConfig::OpenAI { api_key, .. } = entry {
            *api_key = key;
        }
    }
}

/// Load configuration from the default locations.
///
/// Search order:
/// 1. `tleap.toml` in the current directory
/// 2. `~/.config/tleap/config.toml`
///
/// With neither present the built-in defaults apply. `GROQ_API_KEY` and
/// `TLEAP_OPENAI_KEY` are applied on top.
pub fn load_config() -> Result<TleapConfig> {
    load_config_from(None)
}

/// Like [`load_config`], but an explicit `path` must exist and is used
/// instead of the search.
pub fn load_config_from(path: Option<&Path>) -> Result<TleapConfig> {
    let mut config = match locate_config(path)? {
        Some(path) => read_config_file(&path)?,
        None => TleapConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok());
    config
        .providers
        .values_mut()
        .for_each(ProviderConfig::expand_env_vars);

    Ok(config)
}

fn locate_config(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        anyhow::ensure!(path.exists(), "config file not found: {}", path.display());
        return Ok(Some(path.to_path_buf()));
    }

    let local = PathBuf::from("tleap.toml");
    if local.exists() {
        return Ok(Some(local));
    }
    Ok(user_config_dir()
        .map(|dir| dir.join("config.toml"))
        .filter(|path| path.exists()))
}

fn read_config_file(path: &Path) -> Result<TleapConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn user_config_dir() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config").join("tleap"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    let provider: Box<dyn LlmProvider> = match config {
        ProviderConfig::Ollama { base_url } => Box::new(OllamaProvider::new(base_url)?),
        ProviderConfig::OpenAI { api_key, base_url } => {
            anyhow::ensure!(
                !api_key.is_empty(),
                "provider '{name}' has an empty api_key"
            );
            Box::new(OpenAiProvider::new(name, api_key, base_url.clone())?)
        }
    };
    Ok(provider)
}
