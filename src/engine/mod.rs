//! Board mutation engine.
//!
//! - [`mutate`] - pure transitions over an in-memory [`Document`](crate::model::Document)
//! - [`transaction`] - the [`Board`] facade that runs them under the lock

pub mod mutate;
pub mod transaction;

pub use mutate::{week_key, Action, BoardView, EditFields, ListedItem, Outcome, SectionView};
pub use transaction::{ArchiveOutcome, Board, CreateRequest, EditRequest};
