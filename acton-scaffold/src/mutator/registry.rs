//! Append-only record of generated resources (`.acton/registry.json`)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading or writing the registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry file could not be read or written
    #[error("failed to access registry {}: {source}", .path.display())]
    Io {
        /// Registry path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The registry file is not a JSON array of entries
    #[error("registry {} is corrupt: {source}", .path.display())]
    Parse {
        /// Registry path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// Kind of a registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    /// Store-backed resource
    Resource,
    /// Store-less view
    View,
    /// Storage artifacts only
    Schema,
}

/// One generated resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Resource name as typed
    pub name: String,
    /// Route path, or table name for schema-only entries
    pub path: String,
    /// Entry kind
    pub kind: RegistryKind,
}

/// The registry file of one project
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    path: PathBuf,
}

impl ResourceRegistry {
    /// Registry stored at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Registry file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries in insertion order; an absent file is empty
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn entries(&self) -> Result<Vec<RegistryEntry>, RegistryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| self.io(source))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|source| RegistryError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Append `entry` unless an entry with the same path exists
    ///
    /// Returns whether the entry was appended.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, parsed or written.
    pub fn record(&self, entry: RegistryEntry) -> Result<bool, RegistryError> {
        let mut entries = self.entries()?;
        if entries.iter().any(|existing| existing.path == entry.path) {
            tracing::debug!(path = %entry.path, "Registry already has entry");
            return Ok(false);
        }
        entries.push(entry);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io(source))?;
        }
        let mut json = serde_json::to_string_pretty(&entries).map_err(|source| {
            RegistryError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        json.push('\n');
        fs::write(&self.path, json).map_err(|source| self.io(source))?;
        Ok(true)
    }

    fn io(&self, source: std::io::Error) -> RegistryError {
        RegistryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(name: &str, path: &str, kind: RegistryKind) -> RegistryEntry {
        RegistryEntry {
            name: name.to_string(),
            path: path.to_string(),
            kind,
        }
    }

    #[test]
    fn test_record_appends_in_order() {
        let temp = TempDir::new().unwrap();
        let registry = ResourceRegistry::new(temp.path().join(".acton/registry.json"));
        assert!(registry.entries().unwrap().is_empty());

        assert!(registry.record(entry("post", "/posts", RegistryKind::Resource)).unwrap());
        assert!(registry.record(entry("about", "/about", RegistryKind::View)).unwrap());

        let entries = registry.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "/posts");
        assert_eq!(entries[1].kind, RegistryKind::View);
    }

    #[test]
    fn test_dedup_by_path_only() {
        let temp = TempDir::new().unwrap();
        let registry = ResourceRegistry::new(temp.path().join("registry.json"));
        registry.record(entry("post", "/posts", RegistryKind::Resource)).unwrap();

        assert!(!registry.record(entry("Posts", "/posts", RegistryKind::View)).unwrap());
        assert!(registry.record(entry("post", "posts", RegistryKind::Schema)).unwrap());
        assert_eq!(registry.entries().unwrap().len(), 2);
    }

    #[test]
    fn test_file_format() {
        let temp = TempDir::new().unwrap();
        let registry = ResourceRegistry::new(temp.path().join("registry.json"));
        registry.record(entry("post", "/posts", RegistryKind::Resource)).unwrap();
        let raw = fs::read_to_string(registry.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{ "name": "post", "path": "/posts", "kind": "resource" }])
        );
    }

    #[test]
    fn test_corrupt_registry() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("registry.json");
        fs::write(&path, "{ not json").unwrap();
        let err = ResourceRegistry::new(path).entries().unwrap_err();
        assert!(matches!(err, RegistryError::Parse { .. }));
    }
}
