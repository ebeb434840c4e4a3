//! Lint command implementation.

use colored::Colorize;

use crate::engine::Board;
use crate::error::{Error, Result};

/// Lint the board and print the report.
///
/// # Errors
///
/// Returns [`Error::LintFailed`] when the report has errors, or an I/O error
/// if the board cannot be read.
pub fn execute(board: &Board, json: bool) -> Result<()> {
    let report = board.lint()?;

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        if !report.warnings.is_empty() {
            println!("{}", "Warnings:".yellow().bold());
            for warning in &report.warnings {
                println!("   {warning}");
            }
        }
        if !report.errors.is_empty() {
            println!("{}", "Errors:".red().bold());
            for error in &report.errors {
                println!("   {error}");
            }
        }
        if report.is_ok() {
            println!("{}", "Board format is valid".green());
        }
    }

    if report.is_ok() {
        Ok(())
    } else {
        Err(Error::LintFailed {
            errors: report.errors.len(),
        })
    }
}
