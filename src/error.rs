//! Error types for the board CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=busy, 3=not_found, 4=validation, etc.)
//! - Retryability flags (only lock contention is worth retrying)
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::model::Section;

/// Result type alias for board operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Agents match on the string; shell scripts on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Report failures (exit 1)
    LintFailed,
    PrRejected,

    // Contention (exit 2)
    Busy,

    // Not Found (exit 3)
    ItemNotFound,

    // Validation (exit 4)
    InvalidArgument,

    // Transition (exit 5)
    InvalidTransition,
    DuplicateId,

    // Structure (exit 6)
    SectionNotFound,
    MalformedItemLine,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::LintFailed => "LINT_FAILED",
            Self::PrRejected => "PR_REJECTED",
            Self::Busy => "BOARD_BUSY",
            Self::ItemNotFound => "ITEM_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::DuplicateId => "DUPLICATE_ID",
            Self::SectionNotFound => "SECTION_NOT_FOUND",
            Self::MalformedItemLine => "MALFORMED_ITEM_LINE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::LintFailed | Self::PrRejected => 1,
            Self::Busy => 2,
            Self::ItemNotFound => 3,
            Self::InvalidArgument => 4,
            Self::InvalidTransition | Self::DuplicateId => 5,
            Self::SectionNotFound | Self::MalformedItemLine => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether the caller may retry the same request later.
    ///
    /// Only lock contention qualifies. Everything else fails the same
    /// way on a second attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in board operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("ID not found: {id}")]
    NotFound { id: String },

    #[error("ID not found: {id} (did you mean: {}?)", similar.join(", "))]
    NotFoundSimilar { id: String, similar: Vec<String> },

    #[error("Duplicate ID: {id}")]
    DuplicateId { id: String },

    #[error("Missing section: ## {section}")]
    SectionNotFound { section: Section },

    #[error("Malformed item on line {line}: {reason}")]
    MalformedItemLine { line: usize, reason: String },

    #[error("Invalid transition for {id}: {reason}")]
    InvalidTransition { id: String, reason: String },

    #[error("Board is busy, {}", busy_detail(*since, *age_secs))]
    Busy {
        since: Option<DateTime<Utc>>,
        age_secs: Option<u64>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Board lint failed with {errors} error(s)")]
    LintFailed { errors: usize },

    #[error("PR description rejected with {errors} error(s)")]
    PrRejected { errors: usize },
}

fn busy_detail(since: Option<DateTime<Utc>>, age_secs: Option<u64>) -> String {
    match (since, age_secs) {
        (Some(since), Some(age)) => format!(
            "locked since {} (age: {age}s)",
            since.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        _ => "please try again in a moment".to_string(),
    }
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::NotFound { .. } | Self::NotFoundSimilar { .. } => ErrorCode::ItemNotFound,
            Self::DuplicateId { .. } => ErrorCode::DuplicateId,
            Self::SectionNotFound { .. } => ErrorCode::SectionNotFound,
            Self::MalformedItemLine { .. } => ErrorCode::MalformedItemLine,
            Self::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            Self::Busy { .. } => ErrorCode::Busy,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::LintFailed { .. } => ErrorCode::LintFailed,
            Self::PrRejected { .. } => ErrorCode::PrRejected,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint for agents and humans.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotFound { id } => Some(format!(
                "No item with ID '{id}'. Use `board list` to see the live board."
            )),
            Self::NotFoundSimilar { similar, .. } => {
                Some(format!("Did you mean: {}?", similar.join(", ")))
            }

            Self::SectionNotFound { section } => Some(format!(
                "The board must contain a `## {section}` header. Restore it by hand, \
                 then run `board lint`."
            )),

            Self::MalformedItemLine { .. } => {
                Some("Fix the line by hand, then run `board lint` to verify.".to_string())
            }

            Self::InvalidTransition { reason, .. } => {
                if reason.contains("complete") {
                    Some("Use `board complete --id <id>` to finish an item.".to_string())
                } else if reason.contains("block") {
                    Some(
                        "Use `board block --id <id> --reason <text> --review YYYY-MM-DD`."
                            .to_string(),
                    )
                } else {
                    None
                }
            }

            Self::Busy { .. } => Some(
                "Another board command holds the lock. Retry shortly; \
                 `board clean-lock` removes a lock left by a dead process."
                    .to_string(),
            ),

            Self::InvalidArgument(msg) => {
                if msg.contains("owner") {
                    Some("Owners look like ai:<name> or human:<name>, e.g. human:alice".to_string())
                } else if msg.contains("date") {
                    Some("Dates are UTC calendar dates in YYYY-MM-DD form".to_string())
                } else {
                    None
                }
            }

            Self::LintFailed { .. } => {
                Some("Fix the reported lines and run `board lint` again.".to_string())
            }

            Self::PrRejected { .. } => Some(
                "Reference a board item, e.g. \"board:20250811-login-fix\".".to_string(),
            ),

            Self::DuplicateId { .. } | Self::Io(_) | Self::Json(_) | Self::Config(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint. Agents parse this instead of stderr text.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_has_distinct_exit_code() {
        let busy = Error::Busy {
            since: None,
            age_secs: None,
        };
        assert_eq!(busy.exit_code(), 2);
        assert!(busy.error_code().is_retryable());

        let others = [
            Error::InvalidArgument("x".into()),
            Error::NotFound { id: "x".into() },
            Error::SectionNotFound {
                section: Section::Done,
            },
            Error::Config("x".into()),
        ];
        for err in &others {
            assert_ne!(err.exit_code(), 2, "{err}");
            assert!(!err.error_code().is_retryable());
        }
    }

    #[test]
    fn test_busy_message_includes_age() {
        let since = DateTime::from_timestamp_millis(1_754_900_000_000).unwrap();
        let err = Error::Busy {
            since: Some(since),
            age_secs: Some(12),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Board is busy, locked since 2025-"));
        assert!(msg.ends_with("(age: 12s)"));
    }

    #[test]
    fn test_structured_json() {
        let err = Error::NotFoundSimilar {
            id: "20250811-fix".into(),
            similar: vec!["20250811-fox".into()],
        };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "ITEM_NOT_FOUND");
        assert_eq!(json["error"]["exit_code"], 3);
        assert_eq!(json["error"]["retryable"], false);
        assert_eq!(json["error"]["hint"], "Did you mean: 20250811-fox?");
    }

    #[test]
    fn test_transition_hint() {
        let err = Error::InvalidTransition {
            id: "20250811-x".into(),
            reason: "use complete to mark items done".into(),
        };
        assert!(err.hint().unwrap().contains("board complete"));
    }
}
