//! The `tleap log` command.

use anyhow::{Context, Result};

use tleap_core::{AnalysisRecord, Difficulty, Mode};

use super::{open_analysis, GlobalArgs};

pub fn execute(
    global: &GlobalArgs,
    student_id: String,
    score: u32,
    total: u32,
    mode: Mode,
    difficulty: Difficulty,
) -> Result<()> {
    anyhow::ensure!(!student_id.trim().is_empty(), "student-id must not be empty");

    let config = global.load_config()?;
    let log = open_analysis(&config);
    log.append(&AnalysisRecord::new(student_id, score, total, mode, difficulty))
        .context("failed to save analysis")?;

    println!("Analysis saved to {}", log.path().display());
    Ok(())
}
