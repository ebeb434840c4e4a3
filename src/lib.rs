//! Board CLI - a markdown task board for humans and agents
//!
//! This crate provides the core functionality for the `board` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Board types (Item, Section, Document) and the line codec
//! - [`engine`] - State transitions and locked board transactions
//! - [`storage`] - Board file, archive files and the lock sentinel
//! - [`lint`] - Format checks over the whole document
//! - [`pr`] - Pull-request description checks
//! - [`config`] - Configuration management
//! - [`validate`] - Argument validation and id suggestions
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod lint;
pub mod model;
pub mod pr;
pub mod storage;
pub mod validate;

pub use error::{Error, Result};
