//! Kits: named, versioned template bundles resolved through a cascade
//!
//! A kit lives in one of three tiers, searched in this order:
//!
//! 1. **Project**: `<project>/.acton/kits/<kit>/`
//! 2. **User**: `$XDG_CONFIG_HOME/acton-scaffold/kits/<kit>/`
//! 3. **Built-in**: embedded in the binary
//!
//! The manifest (`kit.toml`) comes from the first tier that has one. Every
//! template is resolved on its own, so a project can override a single file
//! and keep falling back for the rest.
//!
//! Loading yields a [`Kit`]. Use [`Kit::bind`] to attach a styling strategy
//! and obtain the [`KitInfo`] generation works with.

mod builtin;
mod manifest;
mod resolver;
mod source;

pub use manifest::{KitManifest, KitSupports, TEMPLATE_RUNTIME};
pub use resolver::{KitCache, KitListing, KitResolver, ResolvedTemplate};
pub use source::{DirectorySource, EmbeddedSource, KitSource};

use crate::styling::{StrategyRegistry, StylingStrategy};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Manifest file name inside a kit directory
pub const MANIFEST_FILE: &str = "kit.toml";

/// Errors raised while resolving kits and their templates
#[derive(Debug, Error)]
pub enum KitError {
    /// No tier provides a manifest for the kit
    #[error("kit '{0}' not found in any search path")]
    NotFound(String),

    /// The manifest is present but invalid
    #[error("invalid manifest for kit '{kit}': {field}: {reason}")]
    InvalidManifest {
        /// Kit name
        kit: String,
        /// Offending manifest field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// No tier provides the template
    #[error("template '{template}' not found for kit '{kit}'")]
    TemplateNotFound {
        /// Kit name
        kit: String,
        /// Template path relative to the kit root
        template: String,
    },

    /// No tier provides the component
    #[error("component '{component}' not found for kit '{kit}'")]
    ComponentNotFound {
        /// Kit name
        kit: String,
        /// Component name
        component: String,
    },

    /// A style-agnostic kit was used without a strategy name
    #[error("kit '{0}' is style-agnostic and needs a styling strategy")]
    StrategyRequired(String),

    /// The requested or declared strategy is not registered
    #[error("unknown styling strategy '{name}'. Available: {available}")]
    UnknownStrategy {
        /// Requested name
        name: String,
        /// Comma separated list of registered strategies
        available: String,
    },

    /// A file in a directory tier could not be read
    #[error("failed to read '{path}': {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Provenance tier of a kit or template
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KitTier {
    /// Project-local overrides
    Project,
    /// User-global overrides
    User,
    /// Embedded kits
    BuiltIn,
}

impl fmt::Display for KitTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::User => write!(f, "user"),
            Self::BuiltIn => write!(f, "built-in"),
        }
    }
}

/// A loaded, validated kit without a styling strategy attached
#[derive(Debug, Clone)]
pub struct Kit {
    manifest: KitManifest,
    version: semver::Version,
    tier: KitTier,
    location: String,
}

impl Kit {
    pub(crate) const fn new(
        manifest: KitManifest,
        version: semver::Version,
        tier: KitTier,
        location: String,
    ) -> Self {
        Self {
            manifest,
            version,
            tier,
            location,
        }
    }

    /// Kit name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    /// Parsed manifest
    #[must_use]
    pub const fn manifest(&self) -> &KitManifest {
        &self.manifest
    }

    /// Semantic version
    #[must_use]
    pub const fn version(&self) -> &semver::Version {
        &self.version
    }

    /// Tier the manifest was loaded from
    #[must_use]
    pub const fn tier(&self) -> KitTier {
        self.tier
    }

    /// Base location of the manifest (directory path or `builtin:<kit>`)
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Attach a styling strategy
    ///
    /// Fixed-style kits always bind their declared strategy; a different
    /// `requested` name is ignored. Style-agnostic kits bind `requested`.
    ///
    /// # Errors
    ///
    /// Returns [`KitError::StrategyRequired`] for a style-agnostic kit
    /// without a request, and [`KitError::UnknownStrategy`] when the name is
    /// not registered.
    pub fn bind(
        self: Arc<Self>,
        requested: Option<&str>,
        strategies: &StrategyRegistry,
    ) -> Result<KitInfo, KitError> {
        let requested = requested.map(str::trim).filter(|name| !name.is_empty());
        let name = match (&self.manifest.styling, requested) {
            (Some(declared), Some(other)) if declared != other => {
                tracing::debug!(
                    kit = %self.name(),
                    declared = %declared,
                    requested = %other,
                    "Kit has a fixed styling strategy, ignoring request"
                );
                declared.as_str()
            }
            (Some(declared), _) => declared.as_str(),
            (None, Some(requested)) => requested,
            (None, None) => return Err(KitError::StrategyRequired(self.name().to_string())),
        };

        let strategy = strategies.get(name).ok_or_else(|| KitError::UnknownStrategy {
            name: name.to_string(),
            available: strategies.names().join(", "),
        })?;

        Ok(KitInfo {
            kit: self,
            strategy,
        })
    }
}

/// A kit with its styling strategy attached
#[derive(Debug, Clone)]
pub struct KitInfo {
    kit: Arc<Kit>,
    strategy: Arc<dyn StylingStrategy>,
}

impl KitInfo {
    /// The underlying kit
    #[must_use]
    pub fn kit(&self) -> &Kit {
        &self.kit
    }

    /// Kit name
    #[must_use]
    pub fn name(&self) -> &str {
        self.kit.name()
    }

    /// Bound strategy
    #[must_use]
    pub fn strategy(&self) -> &Arc<dyn StylingStrategy> {
        &self.strategy
    }
}

impl Serialize for KitInfo {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("KitInfo", 5)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("version", &self.kit.version.to_string())?;
        state.serialize_field("tier", &self.kit.tier)?;
        state.serialize_field("location", &self.kit.location)?;
        state.serialize_field("strategy", self.strategy.name())?;
        state.end()
    }
}
