//! Pull-request description checks.
//!
//! A description must reference a board item as `board:<id>`, and the id must
//! exist on the live board or in one of the weekly archive files. Lookups are
//! read-only; a missing board or archive directory simply finds nothing.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::config::BoardConfig;
use crate::error::{Error, Result};
use crate::model::codec;
use crate::model::ItemId;
use crate::storage::file::read_lines_if_exists;

const BOARD_PREFIX: &str = "board:";
const DOC_PREFIXES: [&str; 2] = ["spec:", "prd:"];
const MIN_DESCRIPTION_LEN: usize = 10;

/// Outcome of checking one description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl PrReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Find the first `board:<id>` reference, with the id lowercased.
///
/// The prefix is matched case-insensitively and must not be glued to a
/// preceding word character.
#[must_use]
pub fn extract_board_ref(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let mut from = 0;
    while let Some(offset) = lower[from..].find(BOARD_PREFIX) {
        let start = from + offset;
        from = start + BOARD_PREFIX.len();

        let glued = lower[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
        if glued {
            continue;
        }

        let candidate: String = lower[from..]
            .chars()
            .take_while(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
            .collect();
        let candidate = candidate.trim_end_matches('-');
        if ItemId::parse(candidate).is_some() {
            return Some(candidate.to_string());
        }
    }
    None
}

/// Whether the text carries a `spec:` or `prd:` reference.
#[must_use]
pub fn has_doc_ref(text: &str) -> bool {
    let lower = text.to_lowercase();
    DOC_PREFIXES.iter().any(|prefix| {
        lower.match_indices(prefix).any(|(at, _)| {
            lower[at + prefix.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-')
        })
    })
}

/// Whether `id` is an item on the board or in any archive file.
///
/// # Errors
///
/// Returns an I/O error if an existing file cannot be read.
pub fn id_exists(config: &BoardConfig, id: &str) -> Result<bool> {
    if let Some(lines) = read_lines_if_exists(&config.board_path)? {
        if contains_item(&lines, id) {
            debug!(id, "Found board reference on the live board");
            return Ok(true);
        }
    }
    archive_contains(&config.archive_dir, id)
}

fn archive_contains(dir: &Path, id: &str) -> Result<bool> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(false);
    };
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        let lines = match read_lines_if_exists(&path) {
            Ok(Some(lines)) => lines,
            Ok(None) => continue,
            Err(Error::Io(e)) if e.kind() == ErrorKind::InvalidData => {
                debug!(file = %path.display(), "Skipping archive file that is not UTF-8");
                continue;
            }
            Err(e) => return Err(e),
        };
        if contains_item(&lines, id) {
            debug!(id, file = %path.display(), "Found board reference in archive");
            return Ok(true);
        }
    }
    Ok(false)
}

fn contains_item(lines: &[String], id: &str) -> bool {
    lines.iter().any(|line| codec::peek_id(line) == Some(id))
}

/// Check a description given whether its board id was found.
#[must_use]
pub fn validate_description(text: &str, board_id: Option<String>, found: bool) -> PrReport {
    let mut report = PrReport::default();

    match &board_id {
        None => report
            .errors
            .push("Missing board:<id> reference (e.g., board:20250811-fix-bug)".to_string()),
        Some(id) if !found => report.errors.push(format!(
            "Unknown board id: {id} (not found in board or archive)"
        )),
        Some(_) => {}
    }

    if !has_doc_ref(text) {
        report
            .warnings
            .push("Consider adding a spec: or prd: reference for better traceability".to_string());
    }
    if text.trim().chars().count() < MIN_DESCRIPTION_LEN {
        report.warnings.push("PR description is very short".to_string());
    }

    report.board_id = board_id;
    report
}

/// Extract, look up and validate in one step.
///
/// # Errors
///
/// Returns an I/O error if the board or an archive file cannot be read.
pub fn check(config: &BoardConfig, text: &str) -> Result<PrReport> {
    let board_id = extract_board_ref(text);
    let found = match &board_id {
        Some(id) => id_exists(config, id)?,
        None => false,
    };
    Ok(validate_description(text, board_id, found))
}
