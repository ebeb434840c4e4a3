//! Board transactions.
//!
//! [`Board`] ties the pure transitions in [`super::mutate`] to the files on
//! disk: validate raw input, take the lock, load, mutate in memory, write
//! back, release. A transition that leaves the lines unchanged writes
//! nothing, and dry runs never write at all.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::BoardConfig;
use crate::error::{Error, Result};
use crate::lint::{self, LintReport};
use crate::model::{Document, Section};
use crate::storage::file;
use crate::storage::BoardLock;
use crate::validate;

use super::mutate::{self, BoardView, EditFields, Outcome};

/// Raw arguments for [`Board::create`].
#[derive(Debug, Clone, Default)]
pub struct CreateRequest<'a> {
    pub title: &'a str,
    pub owner: &'a str,
    pub due: Option<&'a str>,
}

/// Raw arguments for [`Board::edit`].
#[derive(Debug, Clone, Default)]
pub struct EditRequest<'a> {
    pub id: &'a str,
    pub title: Option<&'a str>,
    pub owner: Option<&'a str>,
    pub due: Option<&'a str>,
}

/// What [`Board::archive`] did.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveOutcome {
    pub week: String,
    pub kept: usize,
    /// Archived item lines, in board order.
    pub archived: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Entry point for every board operation.
#[derive(Debug, Clone)]
pub struct Board {
    config: BoardConfig,
    dry_run: bool,
    today: Option<NaiveDate>,
}

impl Board {
    #[must_use]
    pub const fn new(config: BoardConfig) -> Self {
        Self {
            config,
            dry_run: false,
            today: None,
        }
    }

    /// Run transactions in memory only.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Pin "today" instead of reading the UTC clock.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Create a new TODO item.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, [`Error::Busy`] under
    /// contention, or any engine or I/O failure.
    pub fn create(&self, req: &CreateRequest<'_>) -> Result<Outcome> {
        let title = validate::validate_title(req.title)?;
        let owner = validate::parse_owner(req.owner)?;
        let due = req.due.map(|d| validate::parse_date("due", d)).transpose()?;

        self.transact(|doc, today| mutate::create(doc, today, title, owner, due))
    }

    /// Complete an item, optionally replacing its links.
    ///
    /// # Errors
    ///
    /// See [`Board::create`].
    pub fn complete(&self, id: &str, links: Option<&str>) -> Result<Outcome> {
        let links = links.map(validate::validate_links).transpose()?;
        self.transact(|doc, today| mutate::complete(doc, today, id.trim(), links))
    }

    /// Block an item until `review`.
    ///
    /// # Errors
    ///
    /// See [`Board::create`].
    pub fn block(&self, id: &str, reason: &str, review: &str) -> Result<Outcome> {
        let reason = validate::validate_reason(reason)?;
        let review = validate::parse_date("review", review)?;
        self.transact(|doc, _| mutate::block(doc, id.trim(), reason, review))
    }

    /// Return a blocked item to TODO.
    ///
    /// # Errors
    ///
    /// See [`Board::create`].
    pub fn unblock(&self, id: &str) -> Result<Outcome> {
        self.transact(|doc, _| mutate::unblock(doc, id.trim()))
    }

    /// Move an item to the top of `target`.
    ///
    /// # Errors
    ///
    /// See [`Board::create`].
    pub fn move_item(&self, id: &str, target: Section) -> Result<Outcome> {
        self.transact(|doc, _| mutate::move_item(doc, id.trim(), target))
    }

    /// Edit title, owner or due date in place.
    ///
    /// # Errors
    ///
    /// See [`Board::create`].
    pub fn edit(&self, req: &EditRequest<'_>) -> Result<Outcome> {
        let fields = EditFields {
            title: req.title.map(validate::validate_title).transpose()?,
            owner: req.owner.map(validate::parse_owner).transpose()?,
            due: req.due.map(|d| validate::parse_date("due", d)).transpose()?,
        };
        if fields.is_empty() {
            return Err(Error::InvalidArgument(
                "edit requires at least one of --title, --owner, --due".into(),
            ));
        }
        self.transact(|doc, _| mutate::edit(doc, req.id.trim(), fields))
    }

    /// Read-only view of the board. Never creates or locks anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SectionNotFound`] for a board missing a header, or an
    /// I/O error.
    pub fn list(&self) -> Result<BoardView> {
        mutate::list(&self.read_only()?)
    }

    /// Move DONE items beyond `keep` (default from config) into this week's
    /// archive file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] under contention, or any structural or I/O
    /// failure. The archive is appended before the board is rewritten.
    pub fn archive(&self, keep: Option<usize>) -> Result<ArchiveOutcome> {
        let keep = keep.unwrap_or(self.config.done_keep);
        let today = self.today();
        let week = mutate::week_key(today);

        let _lock = BoardLock::acquire(&self.config.lock_file, self.config.lock_max_age)?;
        let mut doc = self.load()?;
        let archived = mutate::take_archivable(&mut doc, keep)?;

        if archived.is_empty() {
            debug!(keep, "Nothing to archive");
            return Ok(ArchiveOutcome {
                week,
                kept: keep,
                archived,
                file: None,
            });
        }

        let target = file::archive_path(&self.config.archive_dir, &week);
        if self.dry_run {
            debug!(count = archived.len(), "Dry run, skipping archive write");
        } else {
            file::append_archive(&self.config.archive_dir, &week, &archived)?;
            file::save_lines(&self.config.board_path, doc.lines())?;
        }
        info!(count = archived.len(), week = %week, "Archived DONE items");

        Ok(ArchiveOutcome {
            week,
            kept: keep,
            archived,
            file: Some(target),
        })
    }

    /// Lint the board file. The file must already exist.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the board cannot be read.
    pub fn lint(&self) -> Result<LintReport> {
        let lines = file::read_lines_if_exists(&self.config.board_path)?.ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Cannot read {}", self.config.board_path.display()),
            ))
        })?;
        Ok(lint::lint(&lines, self.today()))
    }

    /// Run one locked transition and persist the result if it changed.
    fn transact<F>(&self, op: F) -> Result<Outcome>
    where
        F: FnOnce(&mut Document, NaiveDate) -> Result<Outcome>,
    {
        let today = self.today();
        let _lock = BoardLock::acquire(&self.config.lock_file, self.config.lock_max_age)?;

        let mut doc = self.load()?;
        let before = doc.clone();
        let mut outcome = op(&mut doc, today)?;
        outcome.changed = doc != before;

        if !outcome.changed {
            debug!(id = %outcome.id, "Board unchanged, skipping write");
        } else if self.dry_run {
            debug!(id = %outcome.id, "Dry run, skipping write");
        } else {
            file::save_lines(&self.config.board_path, doc.lines())?;
        }

        info!(
            id = %outcome.id,
            action = outcome.action.label(),
            section = %outcome.section,
            changed = outcome.changed,
            "Applied transition"
        );
        Ok(outcome)
    }

    /// Load for writing. Dry runs use the skeleton instead of creating it.
    fn load(&self) -> Result<Document> {
        if self.dry_run {
            return self.read_only();
        }
        Ok(Document::from_lines(file::load_lines(&self.config.board_path)?))
    }

    fn read_only(&self) -> Result<Document> {
        Ok(file::read_lines_if_exists(&self.config.board_path)?
            .map_or_else(Document::skeleton, Document::from_lines))
    }
}
