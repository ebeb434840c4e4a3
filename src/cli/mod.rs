//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Overrides;

pub mod commands;

/// Markdown task board with TODO, BLOCKED and DONE sections
#[derive(Parser, Debug)]
#[command(name = "board", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory that relative paths resolve against (default: current directory)
    #[arg(long, global = true, env = "BOARD_ROOT")]
    pub root: Option<PathBuf>,

    /// Config file (default: <root>/.boardrc.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Board file (default: docs/BOARD.md)
    #[arg(long, global = true, env = "BOARD_PATH")]
    pub board: Option<PathBuf>,

    /// Archive directory (default: docs/board-archive)
    #[arg(long, global = true, env = "BOARD_ARCHIVE_DIR")]
    pub archive_dir: Option<PathBuf>,

    /// Lock sentinel file (default: docs/.board.lock)
    #[arg(long, global = true, env = "BOARD_LOCK_FILE")]
    pub lock_file: Option<PathBuf>,

    /// Output as JSON (for agent integration)
    #[arg(long, alias = "robot", global = true)]
    pub json: bool,

    /// Run the transition without writing any file
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no log output, no error text)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// Path overrides taken from flags and environment.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            root: self.root.clone(),
            config_file: self.config.clone(),
            board_path: self.board.clone(),
            archive_dir: self.archive_dir.clone(),
            lock_file: self.lock_file.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a TODO item
    Create(CreateArgs),

    /// Mark an item done and move it to DONE
    Complete {
        /// Item ID
        #[arg(long)]
        id: String,

        /// Links such as "pr:#42 | commit:abc123" (replaces existing links)
        #[arg(long)]
        links: Option<String>,
    },

    /// Block an item with a reason and review date
    Block(BlockArgs),

    /// Return a blocked item to TODO
    Unblock {
        /// Item ID
        #[arg(long)]
        id: String,
    },

    /// Move an item to another section (TODO or BLOCKED)
    Move {
        /// Item ID
        #[arg(long)]
        id: String,

        /// Target section
        #[arg(long)]
        to: String,
    },

    /// Edit an item's title, owner or due date in place
    Edit(EditArgs),

    /// Show the board
    List,

    /// Move old DONE items into the weekly archive
    Archive {
        /// DONE items to keep on the board (default: DONE_KEEP from config, 50)
        #[arg(long)]
        keep: Option<usize>,
    },

    /// Check the board format
    Lint,

    /// Check that a PR description references a board item
    ValidatePr {
        /// Description text (read from stdin when omitted)
        text: Option<String>,
    },

    /// Remove a lock file left behind by a dead process
    CleanLock,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Item title
    #[arg(long)]
    pub title: String,

    /// Owner, ai:<name> or human:<name>
    #[arg(long)]
    pub owner: String,

    /// Due date (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args, Debug)]
pub struct BlockArgs {
    /// Item ID
    #[arg(long)]
    pub id: String,

    /// Why the item is blocked
    #[arg(long)]
    pub reason: String,

    /// When to look at it again (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub review: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Item ID
    #[arg(long)]
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New owner, ai:<name> or human:<name>
    #[arg(long)]
    pub owner: Option<String>,

    /// New due date (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub due: Option<String>,
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
