//! List command implementation.

use colored::Colorize;

use crate::engine::Board;
use crate::error::Result;

/// Print the three sections.
///
/// Lines that do not parse are still shown, flagged for `board lint`.
///
/// # Errors
///
/// Returns an error if the board cannot be read or lacks a section header.
pub fn execute(board: &Board, json: bool) -> Result<()> {
    let view = board.list()?;

    if json {
        println!("{}", serde_json::to_string(&view)?);
        return Ok(());
    }

    for section in &view.sections {
        println!();
        println!(
            "{} {}",
            format!("## {}", section.section).cyan().bold(),
            format!("({})", section.items.len()).dimmed()
        );
        for listed in &section.items {
            if listed.item.is_some() {
                println!("{}", listed.raw);
            } else {
                println!("{} {}", listed.raw, format!("<- line {}: malformed", listed.line).red());
            }
        }
    }
    Ok(())
}
