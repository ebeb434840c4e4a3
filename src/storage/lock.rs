//! Advisory cross-process lock for the board.
//!
//! The lock is a sentinel file holding `<pid>:<unix_millis>`. Acquisition is
//! a single non-blocking attempt with create-new semantics. A sentinel older
//! than the configured max age is treated as abandoned and evicted once.
//!
//! Checking the age and evicting are two separate steps, so two processes
//! racing on a stale sentinel can both evict it. Only one of them wins the
//! following create.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Held board lock. Dropping it removes the sentinel.
#[derive(Debug)]
pub struct BoardLock {
    path: PathBuf,
}

impl BoardLock {
    /// Acquire the lock at `path`, evicting a sentinel older than `max_age`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if a live sentinel exists, or an I/O error if
    /// the sentinel cannot be written.
    pub fn acquire(path: &Path, max_age: Duration) -> Result<Self> {
        Self::acquire_at(path, max_age, Utc::now())
    }

    /// Acquire with an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`BoardLock::acquire`].
    pub fn acquire_at(path: &Path, max_age: Duration, now: DateTime<Utc>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if let Some(lock) = try_create(path, now)? {
            return Ok(lock);
        }

        let since = sentinel_time(path);
        if let Some(since) = since {
            if !is_stale(since, max_age, now) {
                return Err(Error::Busy {
                    since: Some(since),
                    age_secs: Some(age_secs(since, now)),
                });
            }
            warn!(
                path = %path.display(),
                age_secs = age_secs(since, now),
                "Evicting stale board lock"
            );
            remove_if_present(path)?;
        }

        try_create(path, now)?.ok_or(Error::Busy {
            since: None,
            age_secs: None,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BoardLock {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Released board lock"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to release board lock"),
        }
    }
}

/// Remove the sentinel if it is older than `max_age`.
///
/// Returns whether a sentinel was removed. A missing or live sentinel is left
/// alone.
///
/// # Errors
///
/// Returns an I/O error if the stale sentinel cannot be removed.
pub fn clean_stale(path: &Path, max_age: Duration) -> Result<bool> {
    clean_stale_at(path, max_age, Utc::now())
}

/// [`clean_stale`] with an explicit clock.
///
/// # Errors
///
/// See [`clean_stale`].
pub fn clean_stale_at(path: &Path, max_age: Duration, now: DateTime<Utc>) -> Result<bool> {
    let Some(since) = sentinel_time(path) else {
        return Ok(false);
    };
    if !is_stale(since, max_age, now) {
        return Ok(false);
    }
    remove_if_present(path)?;
    warn!(path = %path.display(), "Removed stale board lock");
    Ok(true)
}

fn try_create(path: &Path, now: DateTime<Utc>) -> Result<Option<BoardLock>> {
    let mut file: File = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let lock = BoardLock {
        path: path.to_path_buf(),
    };
    write!(file, "{}:{}", std::process::id(), now.timestamp_millis())?;
    file.sync_all()?;

    debug!(path = %path.display(), "Acquired board lock");
    Ok(Some(lock))
}

/// When the sentinel was written: its recorded millis, else its mtime.
fn sentinel_time(path: &Path) -> Option<DateTime<Utc>> {
    let recorded = fs::read_to_string(path).ok().and_then(|content| {
        let (_, millis) = content.trim().split_once(':')?;
        DateTime::from_timestamp_millis(millis.parse().ok()?)
    });
    recorded.or_else(|| {
        let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
        Some(DateTime::<Utc>::from(modified))
    })
}

fn is_stale(since: DateTime<Utc>, max_age: Duration, now: DateTime<Utc>) -> bool {
    let max_age = TimeDelta::from_std(max_age).unwrap_or(TimeDelta::MAX);
    now.signed_duration_since(since) > max_age
}

fn age_secs(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from(now.signed_duration_since(since).num_seconds()).unwrap_or(0)
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MAX_AGE: Duration = Duration::from_secs(60);

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn test_acquire_writes_pid_and_millis() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("docs").join(".board.lock");

        let lock = BoardLock::acquire_at(&path, MAX_AGE, at(1_000)).unwrap();
        let content = fs::read_to_string(lock.path()).unwrap();
        assert_eq!(content, format!("{}:1000", std::process::id()));
    }

    #[test]
    fn test_drop_releases() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".board.lock");

        {
            let _lock = BoardLock::acquire(&path, MAX_AGE).unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
        assert!(BoardLock::acquire(&path, MAX_AGE).is_ok());
    }

    #[test]
    fn test_second_acquire_is_busy() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".board.lock");

        let _held = BoardLock::acquire_at(&path, MAX_AGE, at(1_000_000)).unwrap();
        let err = BoardLock::acquire_at(&path, MAX_AGE, at(1_012_000)).unwrap_err();
        match err {
            Error::Busy { since, age_secs } => {
                assert_eq!(since, Some(at(1_000_000)));
                assert_eq!(age_secs, Some(12));
            }
            other => panic!("expected Busy, got {other}"),
        }
        assert!(path.exists());
    }

    #[test]
    fn test_stale_sentinel_is_evicted() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".board.lock");
        fs::write(&path, "99999:1000").unwrap();

        let lock = BoardLock::acquire_at(&path, MAX_AGE, at(1_000 + 61_000)).unwrap();
        let content = fs::read_to_string(lock.path()).unwrap();
        assert!(content.ends_with(":62000"));
    }

    #[test]
    fn test_unparsable_sentinel_falls_back_to_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".board.lock");
        fs::write(&path, "garbage").unwrap();

        // Just written, so the mtime is fresh.
        let err = BoardLock::acquire(&path, MAX_AGE).unwrap_err();
        assert!(matches!(err, Error::Busy { since: Some(_), .. }));
    }

    #[test]
    fn test_clean_stale() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".board.lock");

        assert!(!clean_stale(&path, MAX_AGE).unwrap());

        fs::write(&path, "1:5000").unwrap();
        assert!(!clean_stale_at(&path, MAX_AGE, at(6_000)).unwrap());
        assert!(path.exists());

        assert!(clean_stale_at(&path, MAX_AGE, at(5_000 + 120_000)).unwrap());
        assert!(!path.exists());
    }
}
