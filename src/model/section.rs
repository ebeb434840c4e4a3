//! Board sections.

use serde::Serialize;

use super::item::Item;

/// One of the three fixed board sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Section {
    Todo,
    Blocked,
    Done,
}

impl Section {
    /// All sections in document order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::Blocked, Self::Done];

    /// Name as it appears in the header line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::Blocked => "BLOCKED",
            Self::Done => "DONE",
        }
    }

    /// The structural header line, e.g. `## TODO`.
    #[must_use]
    pub fn header(&self) -> String {
        format!("## {}", self.as_str())
    }

    /// Ways `item` breaks this section's invariants.
    ///
    /// Empty when the item may live in this section.
    #[must_use]
    pub fn violations(&self, item: &Item) -> Vec<&'static str> {
        self.mark_violations(Marks::of(item))
    }

    /// Same checks as [`Section::violations`], from the bare marks of a line.
    ///
    /// A `checked` of `None` skips the checkbox rule.
    #[must_use]
    pub fn mark_violations(&self, marks: Marks) -> Vec<&'static str> {
        let mut out = Vec::new();
        match self {
            Self::Todo => {
                if marks.checked == Some(true) {
                    out.push("TODO item must be unchecked");
                }
                if marks.blocked {
                    out.push("TODO item must not include [blocked] info");
                }
                if marks.completed {
                    out.push("TODO item must not include [completed] date");
                }
            }
            Self::Blocked => {
                if marks.checked == Some(true) {
                    out.push("BLOCKED item must be unchecked");
                }
                if !marks.blocked {
                    out.push("BLOCKED item requires [blocked: <reason>; review: YYYY-MM-DD]");
                }
                if marks.completed {
                    out.push("BLOCKED item must not include [completed] date");
                }
            }
            Self::Done => {
                if marks.checked == Some(false) {
                    out.push("DONE item must be checked");
                }
                if !marks.completed {
                    out.push("DONE item requires [completed: YYYY-MM-DD]");
                }
                if marks.blocked {
                    out.push("DONE item must not include [blocked] info");
                }
            }
        }
        out
    }
}

/// The parts of an item line that decide which section it may live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Marks {
    pub checked: Option<bool>,
    pub blocked: bool,
    pub completed: bool,
}

impl Marks {
    #[must_use]
    pub const fn of(item: &Item) -> Self {
        Self {
            checked: Some(item.checked),
            blocked: item.blocked.is_some(),
            completed: item.completed.is_some(),
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TODO" => Ok(Self::Todo),
            "BLOCKED" => Ok(Self::Blocked),
            "DONE" => Ok(Self::Done),
            _ => Err(format!("Unknown section: {s} (expected TODO|BLOCKED|DONE)")),
        }
    }
}
