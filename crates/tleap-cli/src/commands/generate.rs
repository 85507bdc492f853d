//! The `tleap generate` command.

use anyhow::Result;

use tleap_core::QuestionRequest;

use super::{build_generator, open_history, GlobalArgs, ModelOverrides};

pub async fn execute(
    global: &GlobalArgs,
    request: QuestionRequest,
    overrides: ModelOverrides,
) -> Result<()> {
    anyhow::ensure!(request.count >= 1, "num must be at least 1");

    let config = global.load_config()?;
    let generator = build_generator(&config, &overrides)?;
    let mut history = open_history(&config)?;

    let questions = generator.generate(&request, &mut history).await?;

    if questions.is_empty() {
        eprintln!("No new questions: every generated line is already in the history.");
    } else {
        println!("{questions}");
    }
    Ok(())
}
