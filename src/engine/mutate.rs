//! Pure board transitions.
//!
//! Every function here takes the document explicitly, works only in memory
//! and either applies the whole transition or returns an error with the
//! document unchanged. Arguments arrive already validated.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::codec;
use crate::model::{Blocked, Document, Item, ItemId, Located, Owner, Section};
use crate::validate::find_similar_ids;

/// Which transition produced an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Created,
    Completed,
    Blocked,
    Unblocked,
    Moved,
    Edited,
}

impl Action {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Completed => "Completed",
            Self::Blocked => "Blocked",
            Self::Unblocked => "Unblocked",
            Self::Moved => "Moved",
            Self::Edited => "Edited",
        }
    }
}

/// Result of one item transition.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub action: Action,
    pub id: ItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Section>,
    pub section: Section,
    pub item: Item,
    /// False when the transition left the document as it was.
    pub changed: bool,
}

/// Field updates for [`edit`]. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct EditFields {
    pub title: Option<String>,
    pub owner: Option<Owner>,
    pub due: Option<NaiveDate>,
}

impl EditFields {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.owner.is_none() && self.due.is_none()
    }
}

/// One line of a [`BoardView`].
#[derive(Debug, Clone, Serialize)]
pub struct ListedItem {
    /// 1-based line number in the board file.
    pub line: usize,
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
}

/// Items of one section, top to bottom.
#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub section: Section,
    pub items: Vec<ListedItem>,
}

/// Read-only projection of the live board.
#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub sections: Vec<SectionView>,
}

/// ISO week key used for archive files, e.g. `2025-W33`.
#[must_use]
pub fn week_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{:04}-W{:02}", week.year(), week.week())
}

fn not_found(doc: &Document, id: &str) -> Error {
    let similar = find_similar_ids(id, &doc.known_ids(), 3);
    if similar.is_empty() {
        Error::NotFound { id: id.to_string() }
    } else {
        Error::NotFoundSimilar {
            id: id.to_string(),
            similar,
        }
    }
}

fn find(doc: &Document, id: &str) -> Result<Located> {
    doc.find_item(id)?.ok_or_else(|| not_found(doc, id))
}

fn transition_error(id: &ItemId, reason: &str) -> Error {
    Error::InvalidTransition {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

/// Remove the item's old line and insert its new rendering at the top of
/// `target`. The target header is checked first so a failure changes nothing.
fn relocate(doc: &mut Document, index: usize, item: &Item, target: Section) -> Result<()> {
    doc.locate(target)?;
    doc.remove_line(index);
    doc.insert_at_top(target, codec::render(item))
}

/// Create an item at the top of TODO.
///
/// # Errors
///
/// Returns [`Error::SectionNotFound`] without a TODO header,
/// [`Error::InvalidArgument`] when the title has nothing to slugify, and
/// [`Error::DuplicateId`] if the generated id is somehow taken.
pub fn create(
    doc: &mut Document,
    today: NaiveDate,
    title: String,
    owner: Owner,
    due: Option<NaiveDate>,
) -> Result<Outcome> {
    doc.locate(Section::Todo)?;

    let id = ItemId::generate(today, &title, |candidate| doc.contains_id(candidate)).ok_or_else(
        || Error::InvalidArgument("--title must contain at least one letter or digit".into()),
    )?;
    if doc.contains_id(id.as_str()) {
        return Err(Error::DuplicateId { id: id.to_string() });
    }

    let item = Item::new(id.clone(), title, owner).with_due(due);
    doc.insert_at_top(Section::Todo, codec::render(&item))?;

    Ok(Outcome {
        action: Action::Created,
        id,
        from: None,
        section: Section::Todo,
        item,
        changed: true,
    })
}

/// Check an item off and move it to the top of DONE.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for unknown ids and
/// [`Error::InvalidTransition`] for items already in DONE.
pub fn complete(
    doc: &mut Document,
    today: NaiveDate,
    id: &str,
    links: Option<String>,
) -> Result<Outcome> {
    let Located {
        index,
        section,
        mut item,
    } = find(doc, id)?;
    if section == Section::Done {
        return Err(transition_error(&item.id, "item is already DONE"));
    }

    item.checked = true;
    item.blocked = None;
    item.completed = Some(today);
    if links.is_some() {
        item.links = links;
    }
    relocate(doc, index, &item, Section::Done)?;

    Ok(Outcome {
        action: Action::Completed,
        id: item.id.clone(),
        from: Some(section),
        section: Section::Done,
        item,
        changed: true,
    })
}

/// Record a blocker and move the item to the top of BLOCKED.
///
/// An existing blocked annotation is replaced.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for unknown ids and
/// [`Error::InvalidTransition`] for DONE items.
pub fn block(doc: &mut Document, id: &str, reason: String, review: NaiveDate) -> Result<Outcome> {
    let Located {
        index,
        section,
        mut item,
    } = find(doc, id)?;
    if section == Section::Done {
        return Err(transition_error(&item.id, "DONE items are terminal"));
    }

    item.checked = false;
    item.completed = None;
    item.blocked = Some(Blocked { reason, review });
    relocate(doc, index, &item, Section::Blocked)?;

    Ok(Outcome {
        action: Action::Blocked,
        id: item.id.clone(),
        from: Some(section),
        section: Section::Blocked,
        item,
        changed: true,
    })
}

/// Clear the blocker and move the item to the top of TODO.
///
/// An item already in TODO is left exactly where it is.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for unknown ids and
/// [`Error::InvalidTransition`] for DONE items.
pub fn unblock(doc: &mut Document, id: &str) -> Result<Outcome> {
    let Located {
        index,
        section,
        mut item,
    } = find(doc, id)?;

    match section {
        Section::Done => return Err(transition_error(&item.id, "DONE items are terminal")),
        Section::Todo => {
            return Ok(Outcome {
                action: Action::Unblocked,
                id: item.id.clone(),
                from: Some(section),
                section,
                item,
                changed: false,
            });
        }
        Section::Blocked => {}
    }

    item.checked = false;
    item.blocked = None;
    item.completed = None;
    relocate(doc, index, &item, Section::Todo)?;

    Ok(Outcome {
        action: Action::Unblocked,
        id: item.id.clone(),
        from: Some(section),
        section: Section::Todo,
        item,
        changed: true,
    })
}

/// Move an item to the top of `target`.
///
/// Moving into TODO drops any blocker. Moving into BLOCKED needs an existing
/// blocker and DONE is reachable only through [`complete`].
///
/// # Errors
///
/// Returns [`Error::NotFound`] for unknown ids and
/// [`Error::InvalidTransition`] for the disallowed moves above or when the
/// item is already DONE.
pub fn move_item(doc: &mut Document, id: &str, target: Section) -> Result<Outcome> {
    let Located {
        index,
        section,
        mut item,
    } = find(doc, id)?;

    if target == Section::Done {
        return Err(transition_error(
            &item.id,
            "use complete to move items to DONE",
        ));
    }
    if section == Section::Done {
        return Err(transition_error(&item.id, "DONE items are terminal"));
    }
    if target == Section::Blocked && item.blocked.is_none() {
        return Err(transition_error(
            &item.id,
            "item has no blocker; use block to set a reason and review date",
        ));
    }

    item.checked = false;
    item.completed = None;
    if target == Section::Todo {
        item.blocked = None;
    }
    relocate(doc, index, &item, target)?;

    Ok(Outcome {
        action: Action::Moved,
        id: item.id.clone(),
        from: Some(section),
        section: target,
        item,
        changed: true,
    })
}

/// Update title, owner or due date in place.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] when no field is given and
/// [`Error::NotFound`] for unknown ids.
pub fn edit(doc: &mut Document, id: &str, fields: EditFields) -> Result<Outcome> {
    if fields.is_empty() {
        return Err(Error::InvalidArgument(
            "edit requires at least one of --title, --owner, --due".into(),
        ));
    }
    let Located {
        index,
        section,
        mut item,
    } = find(doc, id)?;

    if let Some(title) = fields.title {
        item.title = title;
    }
    if let Some(owner) = fields.owner {
        item.owner = owner;
    }
    if let Some(due) = fields.due {
        item.due = Some(due);
    }
    doc.replace_line(index, codec::render(&item));

    Ok(Outcome {
        action: Action::Edited,
        id: item.id.clone(),
        from: None,
        section,
        item,
        changed: true,
    })
}

/// Project the three sections for display.
///
/// # Errors
///
/// Returns [`Error::SectionNotFound`] if a header is missing.
pub fn list(doc: &Document) -> Result<BoardView> {
    let sections = Section::ALL
        .iter()
        .map(|&section| -> Result<SectionView> {
            let items = doc
                .items_in(section)?
                .into_iter()
                .map(|(index, raw)| ListedItem {
                    line: index + 1,
                    raw: raw.to_string(),
                    item: codec::parse(raw).ok(),
                })
                .collect();
            Ok(SectionView { section, items })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(BoardView { sections })
}

/// Remove DONE item lines beyond the newest `keep`, returning them in board
/// order.
///
/// # Errors
///
/// Returns [`Error::SectionNotFound`] without a DONE header.
pub fn take_archivable(doc: &mut Document, keep: usize) -> Result<Vec<String>> {
    let indices: Vec<usize> = doc
        .items_in(Section::Done)?
        .into_iter()
        .skip(keep)
        .map(|(index, _)| index)
        .collect();

    let mut taken: Vec<String> = indices
        .iter()
        .rev()
        .map(|&index| doc.remove_line(index))
        .collect();
    taken.reverse();
    Ok(taken)
}
