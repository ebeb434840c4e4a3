//! Board format linter.
//!
//! Walks the document once, tracking which section each line falls in, and
//! re-parses every item line with the codec. A line the codec rejects is
//! still scanned for its checkbox, annotations and dates, so one bad owner
//! does not hide a section mismatch. The walk never mutates anything and
//! never stops at the first problem.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::codec::{self, ParseError, ITEM_SENTINEL, REVIEW_SEP};
use crate::model::{ItemId, Marks, Section};

/// One finding. `line` is 1-based; document-wide findings have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

impl LintIssue {
    fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }

    fn global(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for LintIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "Line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Errors fail the lint; warnings alone do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintReport {
    pub errors: Vec<LintIssue>,
    pub warnings: Vec<LintIssue>,
}

impl LintReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Clone, Copy)]
enum Region {
    Preamble,
    In(Section),
    Other,
}

/// Lint board lines against the format rules, judging dates against `today`.
#[must_use]
pub fn lint(lines: &[String], today: NaiveDate) -> LintReport {
    let mut structure = Vec::new();
    let mut items = LintReport::default();

    let mut seen_headers: HashMap<Section, usize> = HashMap::new();
    let mut ids: Vec<&str> = Vec::new();
    let mut region = Region::Preamble;

    for (index, raw) in lines.iter().enumerate() {
        let number = index + 1;
        let trimmed = raw.trim();

        if let Some(section) = Section::ALL.into_iter().find(|s| trimmed == s.header()) {
            if let Some(first) = seen_headers.get(&section) {
                structure.push(LintIssue::at(
                    number,
                    format!("Duplicate section: ## {section} (first on line {first})"),
                ));
            } else {
                seen_headers.insert(section, number);
            }
            region = Region::In(section);
            continue;
        }
        if trimmed.starts_with("## ") {
            region = Region::Other;
            continue;
        }
        if !raw.starts_with(ITEM_SENTINEL) {
            continue;
        }

        let id = codec::peek_id(raw);
        if let Some(id) = id {
            ids.push(id);
        }

        match region {
            Region::In(section) => lint_item(raw, number, Some(section), today, &mut items),
            Region::Preamble | Region::Other => {
                items.warnings.push(LintIssue::at(
                    number,
                    "Item outside TODO/BLOCKED/DONE sections",
                ));
                // Plain checklists in prose are left alone.
                if id.is_some_and(|id| ItemId::parse(id).is_some()) {
                    lint_item(raw, number, None, today, &mut items);
                }
            }
        }
    }

    let mut report_errors: Vec<LintIssue> = Section::ALL
        .into_iter()
        .filter(|section| !seen_headers.contains_key(section))
        .map(|section| LintIssue::global(format!("Missing section: ## {section}")))
        .collect();

    let duplicates = duplicate_ids(&ids);
    if !duplicates.is_empty() {
        items.errors.push(LintIssue::global(format!(
            "Duplicate IDs: {}",
            duplicates.join(", ")
        )));
    }

    report_errors.extend(structure);
    report_errors.extend(items.errors);
    LintReport {
        errors: report_errors,
        warnings: items.warnings,
    }
}

/// Check one item line. `section` is `None` for lines outside the sections.
fn lint_item(
    raw: &str,
    number: usize,
    section: Option<Section>,
    today: NaiveDate,
    out: &mut LintReport,
) {
    let (marks, dates): (Marks, Vec<(&str, Result<NaiveDate, ParseError>)>) = match codec::parse(raw) {
        Ok(item) => {
            let mut dates = Vec::new();
            if let Some(due) = item.due {
                dates.push(("due", Ok(due)));
            }
            if let Some(blocked) = &item.blocked {
                dates.push(("review", Ok(blocked.review)));
            }
            (Marks::of(&item), dates)
        }
        Err(e) => {
            let label = section.map_or_else(String::new, |s| format!("{s} "));
            out.errors
                .push(LintIssue::at(number, format!("Invalid {label}item format: {e}")));
            let (marks, raw_dates) = scan_marks(raw, section, &e);
            let dates = raw_dates
                .into_iter()
                .map(|(kind, value)| (kind, codec::annotation_date(kind, value)))
                // The parse error already names the first bad date.
                .filter(|(_, date)| date.as_ref().err() != Some(&e))
                .collect();
            (marks, dates)
        }
    };

    if let Some(section) = section {
        for violation in section.mark_violations(marks) {
            out.errors.push(LintIssue::at(number, violation));
        }
    }
    for (kind, date) in dates {
        match date {
            Err(e) => out.errors.push(LintIssue::at(number, e.to_string())),
            Ok(date) if kind == "completed" || date >= today => {}
            Ok(_) if kind == "review" && section == Some(Section::Done) => {}
            Ok(date) => out
                .warnings
                .push(LintIssue::at(number, format!("Past {kind} date: {date}"))),
        }
    }
}

/// Read section marks and raw dates off a line the codec rejected.
///
/// A blocked annotation counts for BLOCKED only when it names a review date,
/// unless the parse error already reported the missing review.
fn scan_marks<'a>(
    raw: &'a str,
    section: Option<Section>,
    error: &ParseError,
) -> (Marks, Vec<(&'static str, &'a str)>) {
    let blocked = bracket_body(raw, "[blocked: ");
    let completed = bracket_body(raw, "[completed: ");
    let marks = Marks {
        checked: match error {
            ParseError::Checkbox => None,
            _ => Some(raw.starts_with("- [x] ")),
        },
        blocked: blocked.is_some_and(|body| {
            section != Some(Section::Blocked)
                || body.contains(REVIEW_SEP)
                || *error == ParseError::MissingReview
        }),
        completed: completed.is_some(),
    };

    let mut dates = Vec::new();
    if let Some(due) = bracket_body(raw, "[due: ") {
        dates.push(("due", due));
    }
    if let Some((_, review)) = blocked.and_then(|body| body.rsplit_once(REVIEW_SEP)) {
        dates.push(("review", review));
    }
    if let Some(completed) = completed {
        dates.push(("completed", completed));
    }
    (marks, dates)
}

fn bracket_body<'a>(raw: &'a str, open: &str) -> Option<&'a str> {
    let start = raw.find(open)? + open.len();
    let len = raw[start..].find(']')?;
    Some(&raw[start..start + len])
}

/// Ids seen more than once, in order of their second appearance.
fn duplicate_ids<'a>(ids: &[&'a str]) -> Vec<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut out = Vec::new();
    for &id in ids {
        let count = counts.entry(id).or_default();
        *count += 1;
        if *count == 2 {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()
    }

    fn run(text: &str) -> LintReport {
        let lines: Vec<String> = text.lines().map(ToString::to_string).collect();
        lint(&lines, today())
    }

    fn messages(issues: &[LintIssue]) -> Vec<String> {
        issues.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_clean_board() {
        let report = run("# Board\n\n## TODO\n\
            - [ ] 20250811-a — A (owner: ai:bot) [due: 2025-09-01]\n\n\
            ## BLOCKED\n\
            - [ ] 20250811-b — B (owner: ai:bot) [blocked: infra; review: 2025-08-20]\n\n\
            ## DONE\n\
            - [x] 20250810-c — C (owner: human:alice) [completed: 2025-08-10] (pr:#1)\n");
        assert_eq!(report, LintReport::default());
        assert!(report.is_ok());
    }

    #[test]
    fn test_blocked_without_review_is_exactly_one_error() {
        let report = run("## TODO\n## BLOCKED\n\
            - [ ] 20250811-b — B (owner: ai:bot) [blocked: waiting on infra]\n\
            ## DONE\n");
        assert_eq!(report.errors.len(), 1, "{:?}", report.errors);
        assert!(!report.is_ok());
        assert_eq!(report.errors[0].line, Some(3));
        assert!(report.errors[0].message.starts_with("Invalid BLOCKED item format"));
    }

    #[test]
    fn test_section_mismatches() {
        let report = run("## TODO\n\
            - [ ] 20250811-a — A (owner: ai:bot) [blocked: x; review: 2025-08-20]\n\
            ## BLOCKED\n\
            - [ ] 20250811-b — B (owner: ai:bot)\n\
            ## DONE\n\
            - [ ] 20250811-c — C (owner: ai:bot)\n");
        assert_eq!(
            messages(&report.errors),
            vec![
                "Line 2: TODO item must not include [blocked] info",
                "Line 4: BLOCKED item requires [blocked: <reason>; review: YYYY-MM-DD]",
                "Line 6: DONE item must be checked",
                "Line 6: DONE item requires [completed: YYYY-MM-DD]",
            ]
        );
    }

    #[test]
    fn test_missing_and_duplicate_sections() {
        let report = run("## TODO\n## DONE\n## TODO\n");
        assert_eq!(
            messages(&report.errors),
            vec![
                "Missing section: ## BLOCKED",
                "Line 3: Duplicate section: ## TODO (first on line 1)",
            ]
        );
    }

    #[test]
    fn test_duplicate_ids_across_sections() {
        let report = run("## TODO\n\
            - [ ] 20250811-a — A (owner: ai:bot)\n\
            ## BLOCKED\n## DONE\n\
            - [x] 20250811-a — A (owner: ai:bot) [completed: 2025-08-12]\n");
        assert_eq!(messages(&report.errors), vec!["Duplicate IDs: 20250811-a"]);
    }

    #[test]
    fn test_date_problems() {
        let report = run("## TODO\n\
            - [ ] 20250811-a — A (owner: ai:bot) [due: 2025-02-30]\n\
            - [ ] 20250811-b — B (owner: ai:bot) [due: 2025-08-01]\n\
            ## BLOCKED\n\
            - [ ] 20250811-c — C (owner: ai:bot) [blocked: x; review: 2025-08-10]\n\
            ## DONE\n\
            - [x] 20250811-d — D (owner: ai:bot) [completed: 2025-01-01]\n");
        assert_eq!(
            messages(&report.errors),
            vec!["Line 2: Invalid TODO item format: Invalid due date value: 2025-02-30"]
        );
        assert_eq!(
            messages(&report.warnings),
            vec![
                "Line 3: Past due date: 2025-08-01",
                "Line 5: Past review date: 2025-08-10",
            ]
        );
        assert!(!report.is_ok());
    }

    #[test]
    fn test_warnings_alone_pass() {
        let report = run("- [ ] 20250811-a — stray (owner: ai:bot)\n## TODO\n## BLOCKED\n## DONE\n");
        assert!(report.is_ok());
        assert_eq!(
            messages(&report.warnings),
            vec!["Line 1: Item outside TODO/BLOCKED/DONE sections"]
        );
    }

    #[test]
    fn test_stray_item_is_still_parsed() {
        let report = run("- [ ] 20250811-a — A (owner: ai:bot) [due: 2025-02-30]\n\
            ## TODO\n## BLOCKED\n## DONE\n");
        assert_eq!(
            messages(&report.errors),
            vec!["Line 1: Invalid item format: Invalid due date value: 2025-02-30"]
        );
        assert_eq!(
            messages(&report.warnings),
            vec!["Line 1: Item outside TODO/BLOCKED/DONE sections"]
        );
        assert!(!report.is_ok());
    }

    #[test]
    fn test_malformed_line_still_gets_section_checks() {
        let report = run("## TODO\n## BLOCKED\n## DONE\n\
            - [ ] 20250811-a — A (owner: bob)\n");
        assert_eq!(
            messages(&report.errors),
            vec![
                "Line 4: Invalid DONE item format: invalid owner \"bob\" (expected ai:<name> or human:<name>)",
                "Line 4: DONE item must be checked",
                "Line 4: DONE item requires [completed: YYYY-MM-DD]",
            ]
        );
    }

    #[test]
    fn test_malformed_line_reports_every_bad_date() {
        let report = run("## TODO\n\
            - [ ] 20250811-a — A (owner: bob) [due: 2025-02-30] [completed: 2025-8-1]\n\
            ## BLOCKED\n\
            - [ ] 20250811-b — B (owner: ai:bot) [blocked: x; review: 2025-13-01] [due: soon]\n\
            ## DONE\n");
        assert_eq!(
            messages(&report.errors),
            vec![
                "Line 2: Invalid TODO item format: invalid owner \"bob\" (expected ai:<name> or human:<name>)",
                "Line 2: TODO item must not include [completed] date",
                "Line 2: Invalid due date value: 2025-02-30",
                "Line 2: Invalid completed date format: 2025-8-1 (expected YYYY-MM-DD)",
                "Line 4: Invalid BLOCKED item format: Invalid review date value: 2025-13-01",
                "Line 4: Invalid due date format: soon (expected YYYY-MM-DD)",
            ]
        );
    }

    #[test]
    fn test_indented_heading_ends_section() {
        let report = run("## TODO\n  ## BLOCKED\n\
            - [ ] 20250811-a — A (owner: ai:bot) [blocked: x; review: 2025-08-20]\n\
            ## DONE\n");
        assert_eq!(report, LintReport::default());
    }

    #[test]
    fn test_unknown_heading_ends_section() {
        let report = run("## TODO\n## Notes\n- [ ] not an item\n## BLOCKED\n## DONE\n");
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 1);
    }
}
