//! The `tleap summary` command.

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use super::{open_analysis, GlobalArgs};

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let config = global.load_config()?;
    let log = open_analysis(&config);
    let summaries = log.summarize().context("failed to read analysis")?;

    if summaries.is_empty() {
        println!("No analysis records in {}", log.path().display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Student", "Sessions", "Score", "Total", "Percent"]);
    for s in &summaries {
        table.add_row(vec![
            Cell::new(&s.student_id),
            Cell::new(s.sessions),
            Cell::new(s.total_score),
            Cell::new(s.total_possible),
            Cell::new(format!("{:.2}%", s.percentage())),
        ]);
    }

    println!("{table}");
    Ok(())
}
