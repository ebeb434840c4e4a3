//! Input validation for raw command arguments.
//!
//! Every string that ends up on a board line goes through here before the
//! board lock is taken, so a bad argument never touches the document.
//! Section names accept a few synonyms so agents can say "backlog" or
//! "waiting" instead of the exact header.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::model::item::{parse_ymd, DateError};
use crate::model::{Owner, Section};

// ── Synonym map (agent typo recovery) ────────────────────────

const SECTION_SYNONYMS: &[(&str, Section)] = &[
    ("backlog", Section::Todo),
    ("open", Section::Todo),
    ("pending", Section::Todo),
    ("waiting", Section::Blocked),
    ("stuck", Section::Blocked),
    ("on-hold", Section::Blocked),
    ("complete", Section::Done),
    ("completed", Section::Done),
    ("closed", Section::Done),
];

/// Resolve a section name via exact match or synonym lookup.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] naming the accepted values, with the
/// closest known name when one is within two edits.
pub fn parse_section(input: &str) -> Result<Section> {
    if let Ok(section) = input.parse::<Section>() {
        return Ok(section);
    }
    let lower = input.trim().to_lowercase();
    if let Some((_, section)) = SECTION_SYNONYMS.iter().find(|(name, _)| *name == lower) {
        return Ok(*section);
    }

    let known: Vec<String> = Section::ALL
        .iter()
        .map(|s| s.as_str().to_lowercase())
        .chain(SECTION_SYNONYMS.iter().map(|(name, _)| (*name).to_string()))
        .collect();
    let suggestion = known
        .iter()
        .map(|name| (levenshtein_distance(&lower, name), name))
        .filter(|(dist, _)| *dist <= 2)
        .min_by_key(|(dist, _)| *dist)
        .map(|(_, name)| format!(" (did you mean '{name}'?)"))
        .unwrap_or_default();

    Err(Error::InvalidArgument(format!(
        "Unknown section: {input} (expected TODO|BLOCKED|DONE){suggestion}"
    )))
}

// ── Field validators ─────────────────────────────────────────

/// Parse an owner argument.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] unless the value is `ai:<name>` or
/// `human:<name>` with a lowercase `[a-z0-9._-]` name.
pub fn parse_owner(raw: &str) -> Result<Owner> {
    Owner::parse(raw.trim()).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "--owner must be ai:<name> or human:<name> (got '{raw}')"
        ))
    })
}

/// Parse a date argument for the flag named `flag` (without dashes).
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for anything that is not a real
/// `YYYY-MM-DD` calendar date.
pub fn parse_date(flag: &str, raw: &str) -> Result<NaiveDate> {
    parse_ymd(raw.trim()).map_err(|e| {
        Error::InvalidArgument(match e {
            DateError::Format => {
                format!("--{flag} must be a UTC date in YYYY-MM-DD (got '{raw}')")
            }
            DateError::Impossible => {
                format!("--{flag} is not a real calendar date: {raw}")
            }
        })
    })
}

/// Validate a title, returning it trimmed.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for empty titles, line breaks, or an
/// embedded owner marker.
pub fn validate_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(Error::InvalidArgument("--title must not be empty".into()));
    }
    if title.contains(['\n', '\r']) {
        return Err(Error::InvalidArgument(
            "--title must be a single line".into(),
        ));
    }
    if title.contains("(owner:") {
        return Err(Error::InvalidArgument(
            "--title must not contain '(owner:'".into(),
        ));
    }
    Ok(title.to_string())
}

/// Validate a blocked reason, returning it trimmed.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for empty reasons, `]`, or line breaks.
pub fn validate_reason(raw: &str) -> Result<String> {
    let reason = raw.trim();
    if reason.is_empty() {
        return Err(Error::InvalidArgument("--reason must not be empty".into()));
    }
    if reason.contains(']') || reason.contains(['\n', '\r']) {
        return Err(Error::InvalidArgument(
            "--reason must be a single line without ']'".into(),
        ));
    }
    Ok(reason.to_string())
}

/// Validate a links value, returning it trimmed.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for empty values, parentheses, or line
/// breaks.
pub fn validate_links(raw: &str) -> Result<String> {
    let links = raw.trim();
    if links.is_empty() {
        return Err(Error::InvalidArgument("--links must not be empty".into()));
    }
    if links.contains(['(', ')', '\n', '\r']) {
        return Err(Error::InvalidArgument(
            "--links must be a single line without parentheses".into(),
        ));
    }
    Ok(links.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single-row optimization
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1) // deletion
                .min(curr[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Find board ids similar to the searched id.
///
/// Returns up to `max` suggestions with edit distance ≤ 3,
/// sorted by distance then alphabetically.
#[must_use]
pub fn find_similar_ids(searched: &str, existing: &[String], max: usize) -> Vec<String> {
    let mut candidates: Vec<(usize, &str)> = existing
        .iter()
        .map(|id| (levenshtein_distance(searched, id), id.as_str()))
        .filter(|(dist, _)| *dist <= 3)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    candidates
        .into_iter()
        .take(max)
        .map(|(_, id)| id.to_string())
        .collect()
}
