//! The `tleap history` command.

use anyhow::{Context, Result};

use super::{open_history, GlobalArgs};

pub fn execute(global: &GlobalArgs, clear: bool) -> Result<()> {
    let config = global.load_config()?;
    let mut history = open_history(&config)?;

    if clear {
        let removed = history.len();
        history.clear();
        history.save().context("failed to clear question history")?;
        println!(
            "Cleared {removed} question(s) from {}",
            history.path().display()
        );
        return Ok(());
    }

    println!(
        "{} question(s) in {}",
        history.len(),
        history.path().display()
    );
    for question in history.entries() {
        println!("  {question}");
    }
    Ok(())
}
