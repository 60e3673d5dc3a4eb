//! Migration file naming and sequencing
//!
//! Files are named `<%Y%m%d%H%M%S>_create_<table>.sql`. When another file
//! already uses the candidate timestamp the clock value is advanced one
//! second at a time until it is free, so two resources generated within the
//! same second still sort in generation order.

use chrono::{DateTime, Duration, Utc};
use std::io;
use std::path::{Path, PathBuf};

/// Timestamp format of migration file prefixes
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Source of the current time
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A migration ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// File name (`20250101120000_create_posts.sql`)
    pub file_name: String,
    /// Table the migration creates
    pub table: String,
    /// Forward statements
    pub up: String,
    /// Reverse statements
    pub down: String,
}

impl MigrationFile {
    /// Pick a free file name in `dir` for a migration creating `table`
    ///
    /// # Errors
    ///
    /// Returns an error when `dir` exists but cannot be listed.
    pub fn sequence(
        dir: &Path,
        table: &str,
        clock: &dyn Clock,
        up: String,
        down: String,
    ) -> io::Result<Self> {
        let existing = list_names(dir)?;
        let mut at = clock.now();
        loop {
            let prefix = format!("{}_", at.format(TIMESTAMP_FORMAT));
            if !existing.iter().any(|name| name.starts_with(&prefix)) {
                return Ok(Self {
                    file_name: format!("{prefix}create_{table}.sql"),
                    table: table.to_string(),
                    up,
                    down,
                });
            }
            tracing::debug!(%prefix, "Migration timestamp taken, advancing one second");
            at += Duration::seconds(1);
        }
    }

    /// File contents with `-- migrate:up` and `-- migrate:down` sections
    #[must_use]
    pub fn contents(&self) -> String {
        format!(
            "-- migrate:up\n{}\n\n-- migrate:down\n{}\n",
            self.up.trim_end(),
            self.down.trim_end()
        )
    }
}

/// An existing migration in `dir` that creates `table`
///
/// # Errors
///
/// Returns an error when `dir` exists but cannot be listed.
pub fn find_create_migration(dir: &Path, table: &str) -> io::Result<Option<PathBuf>> {
    let suffix = format!("_create_{table}.sql");
    Ok(list_names(dir)?
        .into_iter()
        .find(|name| {
            name.strip_suffix(&suffix).is_some_and(|prefix| {
                prefix.len() == 14 && prefix.chars().all(|c| c.is_ascii_digit())
            })
        })
        .map(|name| dir.join(name)))
}

fn list_names(dir: &Path) -> io::Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap())
    }

    #[test]
    fn test_name_from_clock() {
        let temp = TempDir::new().unwrap();
        let migration =
            MigrationFile::sequence(temp.path(), "posts", &clock(), String::new(), String::new())
                .unwrap();
        assert_eq!(migration.file_name, "20250314150926_create_posts.sql");
    }

    #[test]
    fn test_collision_advances_one_second() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("20250314150926_create_users.sql"), "").unwrap();
        fs::write(temp.path().join("20250314150927_create_tags.sql"), "").unwrap();

        let migration =
            MigrationFile::sequence(temp.path(), "posts", &clock(), String::new(), String::new())
                .unwrap();
        assert_eq!(migration.file_name, "20250314150928_create_posts.sql");
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("migrations");
        assert!(find_create_migration(&dir, "posts").unwrap().is_none());
        assert!(MigrationFile::sequence(&dir, "posts", &clock(), String::new(), String::new()).is_ok());
    }

    #[test]
    fn test_find_create_migration_matches_table_exactly() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("20250101000000_create_blog_posts.sql"), "").unwrap();
        assert!(find_create_migration(temp.path(), "posts").unwrap().is_none());
        assert!(find_create_migration(temp.path(), "blog_posts").unwrap().is_some());
    }

    #[test]
    fn test_contents_sections() {
        let migration = MigrationFile {
            file_name: "x.sql".to_string(),
            table: "posts".to_string(),
            up: "CREATE TABLE posts (id INTEGER);\n".to_string(),
            down: "DROP TABLE posts;\n".to_string(),
        };
        assert_eq!(
            migration.contents(),
            "-- migrate:up\nCREATE TABLE posts (id INTEGER);\n\n-- migrate:down\nDROP TABLE posts;\n"
        );
    }
}
