//! Board item model.
//!
//! An item is one task line. The typed fields below are the only state an
//! item has; the line text is derived from them by the codec.

use chrono::NaiveDate;
use serde::Serialize;

/// Separator between the id and the title.
pub const EM_DASH: &str = " — ";

/// Item identifier: `YYYYMMDD-slug`, optionally suffixed `-N`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Parse an id, returning `None` if it does not match `\d{8}-[a-z0-9-]+`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (date, slug) = s.split_at_checked(8)?;
        let slug = slug.strip_prefix('-')?;
        let valid = date.bytes().all(|b| b.is_ascii_digit())
            && !slug.is_empty()
            && slug
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        valid.then(|| Self(s.to_string()))
    }

    /// Generate the first free id for `title` created on `today`.
    ///
    /// The base id is `YYYYMMDD-<slug>`; when taken, `-2`, `-3`, ... are
    /// tried in order. Returns `None` if the title has no slug characters.
    pub fn generate(today: NaiveDate, title: &str, is_taken: impl Fn(&str) -> bool) -> Option<Self> {
        let slug = slugify(title);
        if slug.is_empty() {
            return None;
        }
        let base = format!("{}-{slug}", today.format("%Y%m%d"));
        if !is_taken(&base) {
            return Some(Self(base));
        }
        (2u32..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !is_taken(candidate))
            .map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase, collapse non-alphanumeric runs to one hyphen, trim hyphens.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Who owns an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Ai,
    Human,
}

/// Item owner, `ai:<name>` or `human:<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct Owner {
    kind: OwnerKind,
    name: String,
}

impl Owner {
    /// Parse `(ai|human):[a-z0-9._-]+`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (kind, name) = s.split_once(':')?;
        let kind = match kind {
            "ai" => OwnerKind::Ai,
            "human" => OwnerKind::Human,
            _ => return None,
        };
        let valid = !name.is_empty()
            && name.bytes().all(|b| {
                b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'.' | b'_' | b'-')
            });
        valid.then(|| Self {
            kind,
            name: name.to_string(),
        })
    }

    #[must_use]
    pub const fn kind(&self) -> OwnerKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            OwnerKind::Ai => "ai",
            OwnerKind::Human => "human",
        };
        write!(f, "{kind}:{}", self.name)
    }
}

impl From<Owner> for String {
    fn from(owner: Owner) -> Self {
        owner.to_string()
    }
}

/// Why a date string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateError {
    /// Not shaped like `YYYY-MM-DD`.
    Format,
    /// Shaped correctly but not a real calendar date.
    Impossible,
}

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns [`DateError::Format`] for anything but four, two and two digits
/// separated by hyphens, and [`DateError::Impossible`] for dates such as
/// `2025-02-30`.
pub fn parse_ymd(s: &str) -> Result<NaiveDate, DateError> {
    let bytes = s.as_bytes();
    let shaped = bytes.len() == 10
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { *b == b'-' } else { b.is_ascii_digit() });
    if !shaped {
        return Err(DateError::Format);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| DateError::Impossible)
}

/// Blocked annotation: why, and when to look again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blocked {
    pub reason: String,
    pub review: NaiveDate,
}

/// One task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub owner: Owner,
    pub checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<Blocked>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<String>,
}

impl Item {
    /// A fresh unchecked item without annotations.
    #[must_use]
    pub fn new(id: ItemId, title: String, owner: Owner) -> Self {
        Self {
            id,
            title,
            owner,
            checked: false,
            due: None,
            blocked: None,
            completed: None,
            links: None,
        }
    }

    /// Set the due date.
    #[must_use]
    pub fn with_due(mut self, due: Option<NaiveDate>) -> Self {
        self.due = due;
        self
    }
}
