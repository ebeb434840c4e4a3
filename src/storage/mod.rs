//! Persistence for the board.
//!
//! # Submodules
//!
//! - [`file`] - Line store for the board and append-only archive files
//! - [`lock`] - Sentinel-file lock serializing board writers

pub mod file;
pub mod lock;

pub use lock::BoardLock;
