//! The `tleap init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("tleap.toml").exists() {
        println!("tleap.toml already exists, skipping.");
        return Ok(());
    }

    std::fs::write("tleap.toml", SAMPLE_CONFIG)?;
    println!("Created tleap.toml");

    println!("\nNext steps:");
    println!("  1. Start a local model: ollama serve && ollama pull llama3");
    println!("  2. Run: tleap generate --class 10 --subject Mathematics --topic Fractions");
    println!("  3. Run: tleap log --student-id Student001 --score 8 --total 10 --mode practice --difficulty medium");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# tleap configuration

default_provider = "ollama"
default_model = "llama3"
temperature = 0.8
max_tokens = 800
history_path = "question_history.json"
analysis_path = "analysis.csv"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"

# Hosted alternative: Groq's OpenAI-compatible endpoint.
# [providers.groq]
# type = "openai"
# api_key = "${GROQ_API_KEY}"
# base_url = "https://api.groq.com/openai"
"#;
