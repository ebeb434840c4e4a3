//! Shell completions command implementation.

use crate::cli::{Cli, Shell};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::{generate, shells};
use std::io;

/// Generate shell completions for the specified shell.
///
/// # Errors
///
/// Always returns `Ok`.
pub fn execute(shell: &Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let out = &mut io::stdout();

    match shell {
        Shell::Bash => generate(shells::Bash, &mut cmd, "board", out),
        Shell::Zsh => generate(shells::Zsh, &mut cmd, "board", out),
        Shell::Fish => generate(shells::Fish, &mut cmd, "board", out),
        Shell::PowerShell => generate(shells::PowerShell, &mut cmd, "board", out),
        Shell::Elvish => generate(shells::Elvish, &mut cmd, "board", out),
    }

    Ok(())
}
