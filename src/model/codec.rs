//! Item line codec.
//!
//! Canonical line grammar:
//!
//! ```text
//! - [ |x] <id> — <title> (owner: <owner>)[ [due: D]][ [blocked: R; review: D]][ [completed: D]][ (<links>)]
//! ```
//!
//! [`parse`] is a small cursor parser: a fixed mandatory prefix followed by
//! space-separated annotations in any order. [`render`] always writes the
//! annotations in the canonical order above, so `parse(render(item)) == item`
//! and equal items render to identical bytes.

use chrono::NaiveDate;
use thiserror::Error;

use super::item::{parse_ymd, Blocked, DateError, Item, ItemId, Owner, EM_DASH};

/// Prefix shared by every item line, checked or not.
pub const ITEM_SENTINEL: &str = "- [";

const OWNER_OPEN: &str = " (owner: ";
pub(crate) const REVIEW_SEP: &str = "; review: ";

/// Why a line failed to parse as an item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected \"- [ ] \" or \"- [x] \" checkbox")]
    Checkbox,

    #[error("invalid id \"{0}\" (expected YYYYMMDD-slug)")]
    InvalidId(String),

    #[error("missing \" — \" between id and title")]
    MissingSeparator,

    #[error("empty title")]
    EmptyTitle,

    #[error("missing (owner: ...) after title")]
    MissingOwner,

    #[error("invalid owner \"{0}\" (expected ai:<name> or human:<name>)")]
    InvalidOwner(String),

    #[error("Invalid {kind} date format: {value} (expected YYYY-MM-DD)")]
    DateFormat { kind: &'static str, value: String },

    #[error("Invalid {kind} date value: {value}")]
    ImpossibleDate { kind: &'static str, value: String },

    #[error("[blocked: ...] requires \"<reason>; review: YYYY-MM-DD\"")]
    MissingReview,

    #[error("[blocked: ...] requires a reason")]
    EmptyReason,

    #[error("unknown annotation \"{0}\"")]
    UnknownAnnotation(String),

    #[error("repeated annotation \"{0}\"")]
    RepeatedAnnotation(&'static str),

    #[error("unterminated annotation near \"{0}\"")]
    Unterminated(String),

    #[error("unexpected text \"{0}\" after owner")]
    TrailingText(String),
}

/// Extract the id token of an item line without parsing the rest.
///
/// Returns `None` for lines that are not item lines.
#[must_use]
pub fn peek_id(line: &str) -> Option<&str> {
    let rest = strip_checkbox(line)?.1;
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let id = &rest[..end];
    (!id.is_empty()).then_some(id)
}

fn strip_checkbox(line: &str) -> Option<(bool, &str)> {
    if let Some(rest) = line.strip_prefix("- [ ] ") {
        Some((false, rest))
    } else {
        line.strip_prefix("- [x] ").map(|rest| (true, rest))
    }
}

/// Parse one item line.
///
/// # Errors
///
/// Returns a [`ParseError`] naming the first part of the line that does not
/// follow the grammar.
pub fn parse(line: &str) -> Result<Item, ParseError> {
    let (checked, rest) = strip_checkbox(line).ok_or(ParseError::Checkbox)?;

    let id_end = rest.find(' ').ok_or(ParseError::MissingSeparator)?;
    let raw_id = &rest[..id_end];
    let id = ItemId::parse(raw_id).ok_or_else(|| ParseError::InvalidId(raw_id.to_string()))?;

    let rest = rest[id_end..]
        .strip_prefix(EM_DASH)
        .ok_or(ParseError::MissingSeparator)?;

    let owner_at = rest.find(OWNER_OPEN).ok_or(ParseError::MissingOwner)?;
    let title = &rest[..owner_at];
    if title.trim().is_empty() {
        return Err(ParseError::EmptyTitle);
    }

    let rest = &rest[owner_at + OWNER_OPEN.len()..];
    let owner_end = rest.find(')').ok_or(ParseError::MissingOwner)?;
    let raw_owner = &rest[..owner_end];
    let owner =
        Owner::parse(raw_owner).ok_or_else(|| ParseError::InvalidOwner(raw_owner.to_string()))?;

    let mut item = Item::new(id, title.to_string(), owner);
    item.checked = checked;
    parse_annotations(&rest[owner_end + 1..], &mut item)?;
    Ok(item)
}

fn parse_annotations(mut rest: &str, item: &mut Item) -> Result<(), ParseError> {
    while !rest.is_empty() {
        let Some(body) = rest.strip_prefix(' ') else {
            return Err(ParseError::TrailingText(rest.to_string()));
        };

        if let Some(inner) = body.strip_prefix('[') {
            let close = inner
                .find(']')
                .ok_or_else(|| ParseError::Unterminated(body.to_string()))?;
            apply_bracket(&inner[..close], item)?;
            rest = &inner[close + 1..];
        } else if let Some(inner) = body.strip_prefix('(') {
            let close = inner
                .find(')')
                .ok_or_else(|| ParseError::Unterminated(body.to_string()))?;
            if item.links.is_some() {
                return Err(ParseError::RepeatedAnnotation("links"));
            }
            item.links = Some(inner[..close].to_string());
            rest = &inner[close + 1..];
        } else {
            return Err(ParseError::TrailingText(body.to_string()));
        }
    }
    Ok(())
}

fn apply_bracket(inner: &str, item: &mut Item) -> Result<(), ParseError> {
    let (key, value) = inner
        .split_once(": ")
        .ok_or_else(|| ParseError::UnknownAnnotation(inner.to_string()))?;

    match key {
        "due" => {
            if item.due.is_some() {
                return Err(ParseError::RepeatedAnnotation("due"));
            }
            item.due = Some(annotation_date("due", value)?);
        }
        "completed" => {
            if item.completed.is_some() {
                return Err(ParseError::RepeatedAnnotation("completed"));
            }
            item.completed = Some(annotation_date("completed", value)?);
        }
        "blocked" => {
            if item.blocked.is_some() {
                return Err(ParseError::RepeatedAnnotation("blocked"));
            }
            let (reason, review) = value.rsplit_once(REVIEW_SEP).ok_or(ParseError::MissingReview)?;
            if reason.trim().is_empty() {
                return Err(ParseError::EmptyReason);
            }
            item.blocked = Some(Blocked {
                reason: reason.to_string(),
                review: annotation_date("review", review)?,
            });
        }
        _ => return Err(ParseError::UnknownAnnotation(key.to_string())),
    }
    Ok(())
}

pub(crate) fn annotation_date(kind: &'static str, value: &str) -> Result<NaiveDate, ParseError> {
    parse_ymd(value).map_err(|e| match e {
        DateError::Format => ParseError::DateFormat {
            kind,
            value: value.to_string(),
        },
        DateError::Impossible => ParseError::ImpossibleDate {
            kind,
            value: value.to_string(),
        },
    })
}

/// Render an item as its canonical line.
#[must_use]
pub fn render(item: &Item) -> String {
    let mut line = format!(
        "- [{}] {}{EM_DASH}{}{OWNER_OPEN}{})",
        if item.checked { 'x' } else { ' ' },
        item.id,
        item.title,
        item.owner,
    );
    if let Some(due) = item.due {
        line.push_str(&format!(" [due: {}]", due.format("%Y-%m-%d")));
    }
    if let Some(blocked) = &item.blocked {
        line.push_str(&format!(
            " [blocked: {}{REVIEW_SEP}{}]",
            blocked.reason,
            blocked.review.format("%Y-%m-%d")
        ));
    }
    if let Some(completed) = item.completed {
        line.push_str(&format!(" [completed: {}]", completed.format("%Y-%m-%d")));
    }
    if let Some(links) = &item.links {
        line.push_str(&format!(" ({links})"));
    }
    line
}
