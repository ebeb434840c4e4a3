//! Archive command implementation.

use colored::Colorize;

use crate::engine::Board;
use crate::error::Result;

/// Move DONE items beyond the retention count into this week's archive.
///
/// # Errors
///
/// Returns [`crate::Error::Busy`] under contention, or any I/O failure.
pub fn execute(board: &Board, keep: Option<usize>, json: bool) -> Result<()> {
    let outcome = board.archive(keep)?;

    if json {
        println!("{}", serde_json::to_string(&outcome)?);
        return Ok(());
    }

    match &outcome.file {
        None => println!("Nothing to archive (keeping {} DONE items)", outcome.kept),
        Some(path) => {
            let mut line = format!(
                "{} {} item(s) -> {}",
                "Archived".green(),
                outcome.archived.len(),
                path.display()
            );
            if board.is_dry_run() {
                line.push_str(&format!(" {}", "(dry run)".yellow()));
            }
            println!("{line}");
        }
    }
    Ok(())
}
