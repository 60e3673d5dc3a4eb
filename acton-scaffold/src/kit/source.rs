//! Filesystem abstraction the resolver searches

use super::{builtin, KitError, KitTier, MANIFEST_FILE};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One tier of the kit cascade
pub trait KitSource: Send + Sync + fmt::Debug {
    /// Tier this source belongs to
    fn tier(&self) -> KitTier;

    /// Human-readable location of a kit in this source
    fn location(&self, kit: &str) -> String;

    /// Read a file relative to the kit root, `None` when absent
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read.
    fn read(&self, kit: &str, path: &str) -> Result<Option<String>, KitError>;

    /// Names of kits with a manifest in this source
    ///
    /// # Errors
    ///
    /// Returns an error when the source cannot be enumerated.
    fn kit_names(&self) -> Result<Vec<String>, KitError>;
}

/// Kits stored as directories under a root (`<root>/<kit>/kit.toml`)
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    tier: KitTier,
}

impl DirectorySource {
    /// Create a directory source; the root need not exist
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, tier: KitTier) -> Self {
        Self {
            root: root.into(),
            tier,
        }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl KitSource for DirectorySource {
    fn tier(&self) -> KitTier {
        self.tier
    }

    fn location(&self, kit: &str) -> String {
        self.root.join(kit).display().to_string()
    }

    fn read(&self, kit: &str, path: &str) -> Result<Option<String>, KitError> {
        let file = self.root.join(kit).join(path);
        if !file.is_file() {
            return Ok(None);
        }
        std::fs::read_to_string(&file)
            .map(Some)
            .map_err(|source| KitError::Io {
                path: file.display().to_string(),
                source,
            })
    }

    fn kit_names(&self) -> Result<Vec<String>, KitError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| KitError::Io {
                path: self.root.display().to_string(),
                source: e.into(),
            })?;
            if entry.file_type().is_dir() && entry.path().join(MANIFEST_FILE).is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }
}

/// Kits compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

impl KitSource for EmbeddedSource {
    fn tier(&self) -> KitTier {
        KitTier::BuiltIn
    }

    fn location(&self, kit: &str) -> String {
        format!("builtin:{kit}")
    }

    fn read(&self, kit: &str, path: &str) -> Result<Option<String>, KitError> {
        Ok(builtin::get(kit, path).map(ToString::to_string))
    }

    fn kit_names(&self) -> Result<Vec<String>, KitError> {
        Ok(builtin::kit_names())
    }
}
