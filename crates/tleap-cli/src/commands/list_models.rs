//! The `tleap list-models` command.

use anyhow::Result;

use tleap_providers::ollama::OllamaProvider;
use tleap_providers::{create_provider, ProviderConfig};

use super::GlobalArgs;

pub async fn execute(global: &GlobalArgs, provider_filter: Option<String>) -> Result<()> {
    let config = global.load_config()?;

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();

    let mut found_any = false;
    for name in names {
        if provider_filter.as_ref().is_some_and(|filter| filter != name) {
            continue;
        }

        let models = match &config.providers[name] {
            ProviderConfig::Ollama { base_url } => {
                match OllamaProvider::new(base_url)?.list_models_async().await {
                    Ok(models) => models,
                    Err(e) => {
                        eprintln!("Provider {name}: {e}");
                        continue;
                    }
                }
            }
            other => create_provider(name, other)?.available_models(),
        };

        if !models.is_empty() {
            found_any = true;
            println!("Provider: {name}");
            for model in &models {
                println!("  {} - {}", model.id, model.name);
            }
            println!();
        }
    }

    if !found_any {
        println!("No models found. Run `tleap init` to create a config file.");
    }

    Ok(())
}
