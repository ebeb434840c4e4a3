//! Data models for the board.
//!
//! This module contains the board domain:
//! - Item (and its id, owner and annotation types)
//! - Section
//! - Document (line store view with the section index)
//! - the item line codec

pub mod codec;
pub mod document;
pub mod item;
pub mod section;

pub use document::{Document, Located, SectionRange};
pub use item::{Blocked, Item, ItemId, Owner, OwnerKind};
pub use section::{Marks, Section};
