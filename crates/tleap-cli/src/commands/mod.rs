pub mod demo;
pub mod generate;
pub mod history;
pub mod init;
pub mod list_models;
pub mod log;
pub mod summary;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use tleap_core::{AnalysisLog, QuestionGenerator, QuestionHistory};
use tleap_providers::config::load_config_from;
use tleap_providers::{create_provider, TleapConfig};

/// Options shared by every subcommand.
#[derive(Args)]
pub struct GlobalArgs {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Question history file (overrides history_path)
    #[arg(long, global = true)]
    pub history: Option<PathBuf>,

    /// Analysis CSV file (overrides analysis_path)
    #[arg(long, global = true)]
    pub analysis: Option<PathBuf>,
}

impl GlobalArgs {
    /// Load the config and apply path overrides from the command line.
    pub fn load_config(&self) -> Result<TleapConfig> {
        let mut config = load_config_from(self.config.as_deref())?;
        if let Some(path) = &self.history {
            config.history_path = path.clone();
        }
        if let Some(path) = &self.analysis {
            config.analysis_path = path.clone();
        }
        Ok(config)
    }
}

/// Per-invocation model settings that override the config.
#[derive(Debug, Default)]
pub struct ModelOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

pub fn open_history(config: &TleapConfig) -> Result<QuestionHistory> {
    QuestionHistory::load(&config.history_path).context("failed to open question history")
}

pub fn open_analysis(config: &TleapConfig) -> AnalysisLog {
    AnalysisLog::new(&config.analysis_path)
}

/// Build a generator for the configured (or overridden) provider and model.
pub fn build_generator(
    config: &TleapConfig,
    overrides: &ModelOverrides,
) -> Result<QuestionGenerator> {
    let provider_name = overrides
        .provider
        .as_deref()
        .unwrap_or(&config.default_provider);

    let Some(provider_config) = config.providers.get(provider_name) else {
        anyhow::bail!(
            "provider '{}' not found in config. Available: {:?}",
            provider_name,
            config.providers.keys().collect::<Vec<_>>()
        );
    };
    let provider = create_provider(provider_name, provider_config)?;

    let mut generator_config = config.generator_config();
    if let Some(model) = &overrides.model {
        generator_config.model = model.clone();
    }
    if let Some(temperature) = overrides.temperature {
        anyhow::ensure!(
            (0.0..=2.0).contains(&temperature),
            "temperature must be between 0.0 and 2.0"
        );
        generator_config.temperature = temperature;
    }
    if let Some(max_tokens) = overrides.max_tokens {
        anyhow::ensure!(max_tokens >= 1, "max-tokens must be at least 1");
        generator_config.max_tokens = max_tokens;
    }

    tracing::debug!(
        provider = provider_name,
        model = %generator_config.model,
        "using model provider"
    );
    Ok(QuestionGenerator::new(Arc::from(provider), generator_config))
}
