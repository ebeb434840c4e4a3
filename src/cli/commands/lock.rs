//! Clean-lock command implementation.

use serde::Serialize;

use crate::config::BoardConfig;
use crate::error::Result;
use crate::storage::lock;

#[derive(Serialize)]
struct CleanLockOutput<'a> {
    removed: bool,
    path: &'a std::path::Path,
}

/// Remove the lock sentinel if it is older than the configured timeout.
///
/// # Errors
///
/// Returns an I/O error if a stale sentinel cannot be removed.
pub fn execute(config: &BoardConfig, json: bool) -> Result<()> {
    let removed = if config.lock_file.exists() {
        lock::clean_stale(&config.lock_file, config.lock_max_age)?
    } else {
        false
    };

    if json {
        let output = CleanLockOutput {
            removed,
            path: &config.lock_file,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if removed {
        println!("Cleaned stale lock file");
    } else if config.lock_file.exists() {
        println!("Lock file is still fresh; left in place");
    } else {
        println!("No lock file");
    }
    Ok(())
}
