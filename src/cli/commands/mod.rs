//! Command implementations.

pub mod archive;
pub mod completions;
pub mod item;
pub mod lint;
pub mod list;
pub mod lock;
pub mod pr;
pub mod version;
