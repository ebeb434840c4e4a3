//! Board file operations.
//!
//! This module provides the text line store:
//! - Loading the board as lines, creating the skeleton when absent
//! - Atomic writes: write to temp file, sync to disk, then rename
//! - Append-only archive files with fsync for durability

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::model::document::SKELETON;

/// Split text on any line-ending convention.
///
/// A final terminator does not produce a trailing empty line.
#[must_use]
pub fn split_lines(content: &str) -> Vec<String> {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let body = normalized.strip_suffix('\n').unwrap_or(&normalized);
    if body.is_empty() && normalized.is_empty() {
        return Vec::new();
    }
    body.split('\n').map(ToString::to_string).collect()
}

/// Join lines with `\n` and exactly one trailing newline.
#[must_use]
pub fn join_lines(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Load the board, creating the canonical skeleton if the file is absent.
///
/// # Errors
///
/// Returns an error if the file or its parent directory cannot be created
/// or read.
pub fn load_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        let skeleton: Vec<String> = SKELETON.iter().map(ToString::to_string).collect();
        atomic_write(path, &join_lines(&skeleton))?;
        debug!(path = %path.display(), "Created board skeleton");
    }
    let content = fs::read_to_string(path)?;
    let lines = split_lines(&content);
    debug!(path = %path.display(), lines = lines.len(), "Loaded board");
    Ok(lines)
}

/// Read lines if the file exists, without ever creating it.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn read_lines_if_exists(path: &Path) -> Result<Option<Vec<String>>> {
    if !path.is_file() {
        return Ok(None);
    }
    Ok(Some(split_lines(&fs::read_to_string(path)?)))
}

/// Write the board lines atomically.
///
/// # Errors
///
/// Returns an error if any file operation fails; the previous board is left
/// untouched in that case.
pub fn save_lines(path: &Path, lines: &[String]) -> Result<()> {
    atomic_write(path, &join_lines(lines))?;
    debug!(path = %path.display(), lines = lines.len(), "Saved board");
    Ok(())
}

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a temporary sibling file
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let temp_path = temp_sibling(path);

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Path of the archive file for an ISO week key such as `2025-W33`.
#[must_use]
pub fn archive_path(archive_dir: &Path, week: &str) -> PathBuf {
    archive_dir.join(format!("{week}.md"))
}

/// Append lines to the weekly archive file.
///
/// A new or empty file starts with `# Archive <week>` and a blank line.
/// Existing content is never rewritten; a missing final newline is added
/// before the new lines.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created or written.
pub fn append_archive(archive_dir: &Path, week: &str, lines: &[String]) -> Result<PathBuf> {
    fs::create_dir_all(archive_dir)?;
    let path = archive_path(archive_dir, week);

    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(&path)?;

    let mut chunk = String::new();
    if file.metadata()?.len() == 0 {
        chunk.push_str(&format!("# Archive {week}\n\n"));
    } else if !ends_with_newline(&mut file)? {
        chunk.push('\n');
    }
    chunk.push_str(&join_lines(lines));

    file.write_all(chunk.as_bytes())?;
    file.sync_all()?;

    debug!(path = %path.display(), count = lines.len(), "Appended to archive");
    Ok(path)
}

fn ends_with_newline(file: &mut File) -> Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_split_lines_conventions() {
        assert_eq!(split_lines("a\nb\n"), owned(&["a", "b"]));
        assert_eq!(split_lines("a\r\nb\r\n"), owned(&["a", "b"]));
        assert_eq!(split_lines("a\rb"), owned(&["a", "b"]));
        assert_eq!(split_lines("a\n\n"), owned(&["a", ""]));
        assert_eq!(split_lines(""), Vec::<String>::new());
        assert_eq!(split_lines("\n"), owned(&[""]));
    }

    #[test]
    fn test_join_single_trailing_newline() {
        assert_eq!(join_lines(&owned(&["a", "b"])), "a\nb\n");
        assert_eq!(join_lines(&[]), "\n");
    }

    #[test]
    fn test_load_creates_skeleton() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("docs").join("BOARD.md");

        let lines = load_lines(&path).unwrap();
        assert_eq!(lines, owned(&SKELETON));

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "# Board\n\n## TODO\n\n## BLOCKED\n\n## DONE\n"
        );
    }

    #[test]
    fn test_untouched_round_trip_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("BOARD.md");
        let original = "# Board\n\nprose\n\n## TODO\n- [ ] x\n\n## BLOCKED\n\n## DONE\n";
        fs::write(&path, original).unwrap();

        let lines = load_lines(&path).unwrap();
        save_lines(&path, &lines).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_crlf_is_normalized_on_save() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("BOARD.md");
        fs::write(&path, "## TODO\r\n## BLOCKED\r\n## DONE").unwrap();

        let lines = load_lines(&path).unwrap();
        save_lines(&path, &lines).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "## TODO\n## BLOCKED\n## DONE\n"
        );
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("BOARD.md");
        save_lines(&path, &owned(&["x"])).unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_read_lines_if_exists_never_creates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("BOARD.md");
        assert!(read_lines_if_exists(&path).unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_append_archive_writes_header_once() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("board-archive");

        let path = append_archive(&dir, "2025-W33", &owned(&["- [x] one"])).unwrap();
        append_archive(&dir, "2025-W33", &owned(&["- [x] two", "- [x] three"])).unwrap();

        assert_eq!(path, dir.join("2025-W33.md"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# Archive 2025-W33\n\n- [x] one\n- [x] two\n- [x] three\n"
        );
    }

    #[test]
    fn test_append_archive_after_hand_edit_without_newline() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("board-archive");
        fs::create_dir_all(&dir).unwrap();
        let path = archive_path(&dir, "2025-W33");
        fs::write(&path, "# Archive 2025-W33\n\n- [x] one").unwrap();

        append_archive(&dir, "2025-W33", &owned(&["- [x] two"])).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# Archive 2025-W33\n\n- [x] one\n- [x] two\n"
        );
    }
}
