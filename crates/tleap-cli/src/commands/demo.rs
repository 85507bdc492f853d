//! The `tleap demo` command: one generation call, then one score record.

use anyhow::{Context, Result};

use tleap_core::{AnalysisRecord, Difficulty, Mode, QuestionRequest};

use super::{build_generator, open_analysis, open_history, GlobalArgs, ModelOverrides};

pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let config = global.load_config()?;
    let generator = build_generator(&config, &ModelOverrides::default())?;
    let mut history = open_history(&config)?;

    let request = QuestionRequest {
        class_level: "10".into(),
        subject: "Mathematics".into(),
        topic: "Fractions".into(),
        difficulty: Difficulty::Medium,
        question_type: "MCQ".into(),
        language: "English".into(),
        count: 5,
    };
    let questions = generator.generate(&request, &mut history).await?;
    println!("Generated Questions:\n{questions}");

    open_analysis(&config)
        .append(&AnalysisRecord::new(
            "Student001",
            8,
            10,
            Mode::Practice,
            Difficulty::Medium,
        ))
        .context("failed to save analysis")?;
    println!("Analysis saved to CSV.");

    Ok(())
}
