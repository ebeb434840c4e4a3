//! In-memory board document and its section index.
//!
//! A [`Document`] is the ordered line sequence of the board file. Section
//! ranges are derived on demand from the header lines, so arbitrary prose,
//! blank lines and headings survive every mutation verbatim.

use crate::error::{Error, Result};

use super::codec::{self, ITEM_SENTINEL};
use super::item::{Item, ItemId};
use super::section::Section;

/// Canonical skeleton for a board that does not exist yet.
pub const SKELETON: [&str; 7] = [
    "# Board",
    "",
    "## TODO",
    "",
    "## BLOCKED",
    "",
    "## DONE",
];

/// Location of one section inside the line sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRange {
    /// Index of the `## NAME` header line.
    pub header: usize,
    /// First line after the header.
    pub start: usize,
    /// Next heading or end of document (exclusive).
    pub end: usize,
}

/// An item found by id, with where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub index: usize,
    pub section: Section,
    pub item: Item,
}

/// The board as an ordered sequence of lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    #[must_use]
    pub const fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// A document holding the canonical empty skeleton.
    #[must_use]
    pub fn skeleton() -> Self {
        Self::from_lines(SKELETON.iter().map(ToString::to_string).collect())
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Find a section without failing.
    #[must_use]
    pub fn find_section(&self, section: Section) -> Option<SectionRange> {
        let header = section.header();
        let at = self.lines.iter().position(|l| l.trim() == header)?;
        let end = self.lines[at + 1..]
            .iter()
            .position(|l| l.trim_start().starts_with("## ") && l.trim() != header)
            .map_or(self.lines.len(), |offset| at + 1 + offset);
        Some(SectionRange {
            header: at,
            start: at + 1,
            end,
        })
    }

    /// Locate a section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SectionNotFound`] if the header line is absent.
    pub fn locate(&self, section: Section) -> Result<SectionRange> {
        self.find_section(section)
            .ok_or(Error::SectionNotFound { section })
    }

    /// Item lines of a section as `(line_index, raw_line)`, top to bottom.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SectionNotFound`] if the header line is absent.
    pub fn items_in(&self, section: Section) -> Result<Vec<(usize, &str)>> {
        let range = self.locate(section)?;
        Ok((range.start..range.end)
            .filter(|&i| self.lines[i].starts_with(ITEM_SENTINEL))
            .map(|i| (i, self.lines[i].as_str()))
            .collect())
    }

    /// Insert a line directly below a section header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SectionNotFound`] if the header line is absent.
    pub fn insert_at_top(&mut self, section: Section, line: String) -> Result<()> {
        let range = self.locate(section)?;
        self.lines.insert(range.start, line);
        Ok(())
    }

    /// Remove the line at `index`, returning it.
    pub fn remove_line(&mut self, index: usize) -> String {
        self.lines.remove(index)
    }

    /// Overwrite the line at `index`.
    pub fn replace_line(&mut self, index: usize, line: String) {
        self.lines[index] = line;
    }

    /// Find an item by id in any of the three sections.
    ///
    /// Returns `Ok(None)` when no item line carries the id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SectionNotFound`] if a section header is missing and
    /// [`Error::MalformedItemLine`] if the matching line does not parse.
    pub fn find_item(&self, id: &str) -> Result<Option<Located>> {
        for section in Section::ALL {
            for (index, line) in self.items_in(section)? {
                if codec::peek_id(line) != Some(id) {
                    continue;
                }
                let item = codec::parse(line).map_err(|e| Error::MalformedItemLine {
                    line: index + 1,
                    reason: e.to_string(),
                })?;
                return Ok(Some(Located {
                    index,
                    section,
                    item,
                }));
            }
        }
        Ok(None)
    }

    /// Id tokens of every item line in the document, in order.
    #[must_use]
    pub fn item_ids(&self) -> Vec<&str> {
        self.lines.iter().filter_map(|l| codec::peek_id(l)).collect()
    }

    /// Whether `id` is already used by some item line.
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.item_ids().contains(&id)
    }

    /// Ids known to the board, for "did you mean" suggestions.
    #[must_use]
    pub fn known_ids(&self) -> Vec<String> {
        self.item_ids()
            .into_iter()
            .filter(|id| ItemId::parse(id).is_some())
            .map(ToString::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::from_lines(text.lines().map(ToString::to_string).collect())
    }

    const BOARD: &str = "# Board
Some prose that must survive.

## TODO
- [ ] 20250811-a — A (owner: ai:bot)
notes about A

## BLOCKED
- [ ] 20250811-b — B (owner: ai:bot) [blocked: infra; review: 2025-08-20]

## DONE
- [x] 20250810-c — C (owner: human:alice) [completed: 2025-08-10]
- [x] 20250809-d — D (owner: human:alice) [completed: 2025-08-09]
";

    #[test]
    fn test_locate_ranges() {
        let d = doc(BOARD);
        let todo = d.locate(Section::Todo).unwrap();
        assert_eq!(todo.header, 3);
        assert_eq!(todo.start, 4);
        assert_eq!(todo.end, 7);
        let done = d.locate(Section::Done).unwrap();
        assert_eq!(done.end, d.lines().len());
    }

    #[test]
    fn test_section_ends_at_any_heading() {
        let d = doc("## TODO\n- [ ] 20250811-a — A (owner: ai:bot)\n## Notes\n- [ ] stray\n## BLOCKED\n## DONE");
        let todo = d.locate(Section::Todo).unwrap();
        assert_eq!(todo.end, 2);
        assert_eq!(d.items_in(Section::Todo).unwrap().len(), 1);
    }

    #[test]
    fn test_header_is_case_sensitive() {
        let d = doc("## todo\n## BLOCKED\n## DONE");
        assert!(matches!(
            d.locate(Section::Todo),
            Err(Error::SectionNotFound {
                section: Section::Todo
            })
        ));
        assert!(d.locate(Section::Done).is_ok());
    }

    #[test]
    fn test_header_tolerates_surrounding_whitespace() {
        let d = doc("  ## TODO  \n## BLOCKED\n## DONE");
        assert_eq!(d.locate(Section::Todo).unwrap().header, 0);
    }

    #[test]
    fn test_indented_header_ends_previous_section() {
        let d = doc("## TODO\n  ## BLOCKED\n\
            - [ ] 20250811-a — A (owner: ai:bot) [blocked: x; review: 2025-08-20]\n## DONE");
        assert_eq!(d.locate(Section::Todo).unwrap().end, 1);
        assert!(d.items_in(Section::Todo).unwrap().is_empty());
        let found = d.find_item("20250811-a").unwrap().unwrap();
        assert_eq!(found.section, Section::Blocked);
    }

    #[test]
    fn test_items_in_skips_prose() {
        let d = doc(BOARD);
        let items = d.items_in(Section::Todo).unwrap();
        assert_eq!(items, vec![(4, "- [ ] 20250811-a — A (owner: ai:bot)")]);
        assert_eq!(d.items_in(Section::Done).unwrap().len(), 2);
    }

    #[test]
    fn test_insert_at_top() {
        let mut d = doc(BOARD);
        d.insert_at_top(Section::Blocked, "- [ ] new".into()).unwrap();
        assert_eq!(d.lines()[7], "## BLOCKED");
        assert_eq!(d.lines()[8], "- [ ] new");
    }

    #[test]
    fn test_insert_into_missing_section_fails() {
        let mut d = doc("## TODO\n## DONE");
        let before = d.clone();
        assert!(d.insert_at_top(Section::Blocked, "x".into()).is_err());
        assert_eq!(d, before);
    }

    #[test]
    fn test_find_item_across_sections() {
        let d = doc(BOARD);
        let found = d.find_item("20250811-b").unwrap().unwrap();
        assert_eq!(found.section, Section::Blocked);
        assert_eq!(found.index, 8);
        assert_eq!(found.item.title, "B");

        assert!(d.find_item("20250811-zzz").unwrap().is_none());
        // prefix of another id must not match
        assert!(d.find_item("20250811").unwrap().is_none());
    }

    #[test]
    fn test_find_item_malformed() {
        let d = doc("## TODO\n- [ ] 20250811-a — A (owner: nobody)\n## BLOCKED\n## DONE");
        assert!(matches!(
            d.find_item("20250811-a"),
            Err(Error::MalformedItemLine { line: 2, .. })
        ));
    }

    #[test]
    fn test_item_ids() {
        let d = doc(BOARD);
        assert_eq!(
            d.item_ids(),
            vec!["20250811-a", "20250811-b", "20250810-c", "20250809-d"]
        );
        assert!(d.contains_id("20250810-c"));
        assert!(!d.contains_id("20250810"));
    }

    #[test]
    fn test_skeleton_has_all_sections() {
        let d = Document::skeleton();
        for section in Section::ALL {
            assert!(d.locate(section).is_ok());
            assert!(d.items_in(section).unwrap().is_empty());
        }
    }
}
