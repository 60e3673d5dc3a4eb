//! Writing rendered artifacts to disk

use serde::Serialize;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// What happened to one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOutcome {
    /// New file
    Created,
    /// Existing file overwritten (`force`)
    Updated,
    /// Fragment appended to a shared file
    Appended,
    /// Content already present
    Unchanged,
    /// Existing file differs and was left alone
    Skipped,
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Appended => "appended",
            Self::Unchanged => "unchanged",
            Self::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

/// One artifact of a generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// Path relative to the project root
    pub path: PathBuf,
    /// Outcome
    pub outcome: WriteOutcome,
}

/// Write a per-resource file
///
/// Identical content is left untouched. Different content is only replaced
/// when `force` is set.
///
/// # Errors
///
/// Returns I/O errors from reading or writing the file.
pub fn write_file(path: &Path, content: &str, force: bool) -> io::Result<WriteOutcome> {
    if path.exists() {
        let existing = fs::read_to_string(path)?;
        if existing == content {
            return Ok(WriteOutcome::Unchanged);
        }
        if !force {
            return Ok(WriteOutcome::Skipped);
        }
        fs::write(path, content)?;
        return Ok(WriteOutcome::Updated);
    }

    ensure_parent(path)?;
    fs::write(path, content)?;
    Ok(WriteOutcome::Created)
}

/// Create a file that must not exist yet
///
/// # Errors
///
/// Returns [`io::ErrorKind::AlreadyExists`] when the path is taken.
pub fn create_new(path: &Path, content: &str) -> io::Result<WriteOutcome> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(content.as_bytes())?;
    Ok(WriteOutcome::Created)
}

/// Append a fragment to a shared file
///
/// A blank line separates the fragment from existing content; an empty or
/// absent file gets no separator. A fragment already present verbatim is not
/// appended again.
///
/// # Errors
///
/// Returns I/O errors from reading or writing the file.
pub fn append_fragment(path: &Path, fragment: &str) -> io::Result<WriteOutcome> {
    let fragment = fragment.trim_end();
    if fragment.trim().is_empty() {
        return Ok(WriteOutcome::Unchanged);
    }

    let existing = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };
    if existing.contains(fragment) {
        return Ok(WriteOutcome::Unchanged);
    }

    let mut addition = String::new();
    if !existing.trim().is_empty() {
        if !existing.ends_with('\n') {
            addition.push('\n');
        }
        addition.push('\n');
    }
    addition.push_str(fragment);
    addition.push('\n');

    ensure_parent(path)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(addition.as_bytes())?;
    Ok(if existing.is_empty() {
        WriteOutcome::Created
    } else {
        WriteOutcome::Appended
    })
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_file_outcomes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("src/post/mod.rs");

        assert_eq!(write_file(&path, "a", false).unwrap(), WriteOutcome::Created);
        assert_eq!(write_file(&path, "a", false).unwrap(), WriteOutcome::Unchanged);
        assert_eq!(write_file(&path, "b", false).unwrap(), WriteOutcome::Skipped);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a");
        assert_eq!(write_file(&path, "b", true).unwrap(), WriteOutcome::Updated);
        assert_eq!(fs::read_to_string(&path).unwrap(), "b");
    }

    #[test]
    fn test_create_new_refuses_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("migrations/1_create_posts.sql");
        create_new(&path, "up").unwrap();
        let err = create_new(&path, "again").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_append_separator_only_when_non_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("db/schema.sql");

        assert_eq!(append_fragment(&path, "CREATE TABLE a;\n").unwrap(), WriteOutcome::Created);
        assert_eq!(fs::read_to_string(&path).unwrap(), "CREATE TABLE a;\n");

        assert_eq!(append_fragment(&path, "CREATE TABLE b;\n").unwrap(), WriteOutcome::Appended);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "CREATE TABLE a;\n\nCREATE TABLE b;\n"
        );
    }

    #[test]
    fn test_append_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("db/queries.sql");
        append_fragment(&path, "-- name: list_posts\nSELECT 1;\n").unwrap();
        let first = fs::read_to_string(&path).unwrap();

        assert_eq!(
            append_fragment(&path, "-- name: list_posts\nSELECT 1;\n").unwrap(),
            WriteOutcome::Unchanged
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn test_append_to_file_without_trailing_newline() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("schema.sql");
        fs::write(&path, "CREATE TABLE a;").unwrap();
        append_fragment(&path, "CREATE TABLE b;").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "CREATE TABLE a;\n\nCREATE TABLE b;\n"
        );
    }
}
