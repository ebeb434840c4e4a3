//! PR description validation command.

use std::io::Read;

use colored::Colorize;

use crate::config::BoardConfig;
use crate::error::{Error, Result};
use crate::pr;

/// Validate a PR description given inline or on stdin.
///
/// # Errors
///
/// Returns [`Error::PrRejected`] when the description has errors, or an I/O
/// error if stdin or a board file cannot be read.
pub fn execute(config: &BoardConfig, text: Option<&str>, json: bool) -> Result<()> {
    let description = match text {
        Some(text) => text.to_string(),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let report = pr::check(config, &description)?;

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        if !report.warnings.is_empty() {
            println!("{}", "Warnings:".yellow().bold());
            for warning in &report.warnings {
                println!("   {warning}");
            }
        }
        if report.is_ok() {
            println!("{}", "PR description looks good".green());
        } else {
            println!("{}", "Required:".red().bold());
            for error in &report.errors {
                println!("   {error}");
            }
            println!();
            println!("Example: \"fix: resolve login issue\n\nboard:20250811-login-fix\nspec:SPEC-LOGIN-AUTH\"");
        }
    }

    if report.is_ok() {
        Ok(())
    } else {
        Err(Error::PrRejected {
            errors: report.errors.len(),
        })
    }
}
