//! Item transition commands: create, complete, block, unblock, move, edit.

use colored::Colorize;
use serde::Serialize;

use crate::cli::{BlockArgs, CreateArgs, EditArgs};
use crate::engine::{Action, Board, CreateRequest, EditRequest, Outcome};
use crate::error::Result;
use crate::validate;

#[derive(Serialize)]
struct OutcomeOutput<'a> {
    #[serde(flatten)]
    outcome: &'a Outcome,
    dry_run: bool,
}

/// Execute `create`.
///
/// # Errors
///
/// Returns the engine error unchanged.
pub fn execute_create(board: &Board, args: &CreateArgs, json: bool) -> Result<()> {
    let outcome = board.create(&CreateRequest {
        title: &args.title,
        owner: &args.owner,
        due: args.due.as_deref(),
    })?;
    report(board, &outcome, json)
}

/// Execute `complete`.
///
/// # Errors
///
/// Returns the engine error unchanged.
pub fn execute_complete(board: &Board, id: &str, links: Option<&str>, json: bool) -> Result<()> {
    let outcome = board.complete(id, links)?;
    report(board, &outcome, json)
}

/// Execute `block`.
///
/// # Errors
///
/// Returns the engine error unchanged.
pub fn execute_block(board: &Board, args: &BlockArgs, json: bool) -> Result<()> {
    let outcome = board.block(&args.id, &args.reason, &args.review)?;
    report(board, &outcome, json)
}

/// Execute `unblock`.
///
/// # Errors
///
/// Returns the engine error unchanged.
pub fn execute_unblock(board: &Board, id: &str, json: bool) -> Result<()> {
    let outcome = board.unblock(id)?;
    report(board, &outcome, json)
}

/// Execute `move`.
///
/// # Errors
///
/// Returns a validation error for an unknown section name, otherwise the
/// engine error unchanged.
pub fn execute_move(board: &Board, id: &str, to: &str, json: bool) -> Result<()> {
    let target = validate::parse_section(to)?;
    let outcome = board.move_item(id, target)?;
    report(board, &outcome, json)
}

/// Execute `edit`.
///
/// # Errors
///
/// Returns the engine error unchanged.
pub fn execute_edit(board: &Board, args: &EditArgs, json: bool) -> Result<()> {
    let outcome = board.edit(&EditRequest {
        id: &args.id,
        title: args.title.as_deref(),
        owner: args.owner.as_deref(),
        due: args.due.as_deref(),
    })?;
    report(board, &outcome, json)
}

fn report(board: &Board, outcome: &Outcome, json: bool) -> Result<()> {
    let dry_run = board.is_dry_run();

    if json {
        let output = OutcomeOutput { outcome, dry_run };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    let label = format!("{}:", outcome.action.label()).green();
    let mut line = match outcome.action {
        Action::Moved => format!("{label} {} -> {}", outcome.id, outcome.section),
        _ => format!("{label} {}", outcome.id),
    };
    if !outcome.changed {
        line.push_str(&format!(" {}", "(no change)".dimmed()));
    }
    if dry_run {
        line.push_str(&format!(" {}", "(dry run)".yellow()));
    }
    println!("{line}");
    Ok(())
}
