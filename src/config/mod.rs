//! Configuration management.
//!
//! Board paths and limits are resolved once per invocation, in order:
//!
//! 1. Command-line flags and their environment variables
//! 2. The optional `.boardrc.json` file in the root directory
//! 3. Built-in defaults
//!
//! Relative paths are resolved against the root directory, which defaults to
//! the current working directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Name of the optional config file in the root directory.
pub const RC_FILE: &str = ".boardrc.json";

pub const DEFAULT_BOARD_PATH: &str = "docs/BOARD.md";
pub const DEFAULT_ARCHIVE_DIR: &str = "docs/board-archive";
pub const DEFAULT_LOCK_FILE: &str = "docs/.board.lock";
pub const DEFAULT_DONE_KEEP: usize = 50;
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 60_000;

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub root: PathBuf,
    pub board_path: PathBuf,
    pub archive_dir: PathBuf,
    pub lock_file: PathBuf,
    /// DONE items kept on the board by `archive`.
    pub done_keep: usize,
    /// Age after which a lock sentinel counts as abandoned.
    pub lock_max_age: Duration,
}

impl BoardConfig {
    /// Defaults rooted at `root`.
    #[must_use]
    pub fn with_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            board_path: root.join(DEFAULT_BOARD_PATH),
            archive_dir: root.join(DEFAULT_ARCHIVE_DIR),
            lock_file: root.join(DEFAULT_LOCK_FILE),
            done_keep: DEFAULT_DONE_KEEP,
            lock_max_age: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
        }
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub root: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub board_path: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
    pub lock_file: Option<PathBuf>,
}

/// On-disk shape of `.boardrc.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RcFile {
    board_path: Option<PathBuf>,
    archive_dir: Option<PathBuf>,
    lock_file: Option<PathBuf>,
    #[serde(rename = "DONE_KEEP")]
    done_keep: Option<usize>,
    /// Milliseconds.
    lock_timeout: Option<u64>,
}

/// Resolve the configuration for this invocation.
///
/// A config file named with `--config` must exist; the default
/// `<root>/.boardrc.json` is optional.
///
/// # Errors
///
/// Returns [`Error::Config`] if the current directory is unavailable or the
/// config file cannot be read or parsed.
pub fn load(overrides: &Overrides) -> Result<BoardConfig> {
    let root = match &overrides.root {
        Some(root) => absolutize(root)?,
        None => std::env::current_dir()
            .map_err(|e| Error::Config(format!("Cannot determine current directory: {e}")))?,
    };

    let rc = match &overrides.config_file {
        Some(path) => read_rc(&resolve(&root, path))?,
        None => {
            let path = root.join(RC_FILE);
            if path.exists() {
                read_rc(&path)?
            } else {
                RcFile::default()
            }
        }
    };

    let pick = |flag: &Option<PathBuf>, file: Option<PathBuf>, default: &str| {
        let chosen = flag.clone().or(file).unwrap_or_else(|| PathBuf::from(default));
        resolve(&root, &chosen)
    };

    Ok(BoardConfig {
        board_path: pick(&overrides.board_path, rc.board_path, DEFAULT_BOARD_PATH),
        archive_dir: pick(&overrides.archive_dir, rc.archive_dir, DEFAULT_ARCHIVE_DIR),
        lock_file: pick(&overrides.lock_file, rc.lock_file, DEFAULT_LOCK_FILE),
        done_keep: rc.done_keep.unwrap_or(DEFAULT_DONE_KEEP),
        lock_max_age: Duration::from_millis(rc.lock_timeout.unwrap_or(DEFAULT_LOCK_TIMEOUT_MS)),
        root,
    })
}

fn read_rc(path: &Path) -> Result<RcFile> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| Error::Config(format!("Cannot determine current directory: {e}")))?;
    Ok(cwd.join(path))
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rooted(temp_dir: &TempDir) -> Overrides {
        Overrides {
            root: Some(temp_dir.path().to_path_buf()),
            ..Overrides::default()
        }
    }

    #[test]
    fn test_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load(&rooted(&temp_dir)).unwrap();
        assert_eq!(config, BoardConfig::with_root(temp_dir.path()));
        assert_eq!(config.board_path, temp_dir.path().join("docs/BOARD.md"));
        assert_eq!(config.lock_max_age, Duration::from_secs(60));
    }

    #[test]
    fn test_rc_file_values() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(RC_FILE),
            r#"{"boardPath": "BOARD.md", "archiveDir": "/abs/archive", "DONE_KEEP": 5, "lockTimeout": 1500}"#,
        )
        .unwrap();

        let config = load(&rooted(&temp_dir)).unwrap();
        assert_eq!(config.board_path, temp_dir.path().join("BOARD.md"));
        assert_eq!(config.archive_dir, PathBuf::from("/abs/archive"));
        assert_eq!(config.lock_file, temp_dir.path().join(DEFAULT_LOCK_FILE));
        assert_eq!(config.done_keep, 5);
        assert_eq!(config.lock_max_age, Duration::from_millis(1500));
    }

    #[test]
    fn test_flags_beat_rc_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(RC_FILE), r#"{"boardPath": "from-rc.md"}"#).unwrap();

        let overrides = Overrides {
            board_path: Some(PathBuf::from("from-flag.md")),
            ..rooted(&temp_dir)
        };
        let config = load(&overrides).unwrap();
        assert_eq!(config.board_path, temp_dir.path().join("from-flag.md"));
    }

    #[test]
    fn test_explicit_config_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("custom.json"), r#"{"lockFile": "x.lock"}"#).unwrap();

        let overrides = Overrides {
            config_file: Some(PathBuf::from("custom.json")),
            ..rooted(&temp_dir)
        };
        let config = load(&overrides).unwrap();
        assert_eq!(config.lock_file, temp_dir.path().join("x.lock"));

        let missing = Overrides {
            config_file: Some(PathBuf::from("missing.json")),
            ..rooted(&temp_dir)
        };
        assert!(matches!(load(&missing), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(RC_FILE), "{ not json").unwrap();

        let err = load(&rooted(&temp_dir)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.exit_code(), 7);
    }
}
