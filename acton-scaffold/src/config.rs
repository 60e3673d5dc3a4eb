//! Scaffold configuration
//!
//! Loaded with figment, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. `~/.config/acton-scaffold/config.toml`
//! 3. `<project>/.acton/config.toml`
//! 4. Environment variables (`ACTON_SCAFFOLD_*`, `__` for nesting, e.g.
//!    `ACTON_SCAFFOLD_DEFAULTS__KIT=admin`)
//!
//! ```toml
//! [defaults]
//! kit = "default"
//! styling = "tailwind"
//! pagination = "offset"
//! page_size = 25
//! edit_surface = "modal"
//! dialect = "sqlite"
//!
//! [paths]
//! composition_root = "src/main.rs"
//!
//! [anchors]
//! imports = "// acton:end-mods"
//! routes = "// acton:routes"
//!
//! [validator]
//! context_lines = 3
//! ```

use crate::field::Dialect;
use crate::generator::{EditSurface, GenerationOptions, PaginationMode};
use crate::mutator::{DEFAULT_IMPORTS_ANCHOR, DEFAULT_ROUTES_ANCHOR};
use crate::validator::DEFAULT_CONTEXT_LINES;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project-level configuration directory
pub const PROJECT_DIR: &str = ".acton";

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Defaults could not be serialized
    #[error("failed to serialize default configuration: {0}")]
    Defaults(#[from] toml::ser::Error),

    /// A source is malformed or a value has the wrong type
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Defaults applied when a command does not say otherwise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Kit name
    pub kit: String,
    /// Strategy for style-agnostic kits
    pub styling: Option<String>,
    /// Pagination mode
    pub pagination: PaginationMode,
    /// Rows per page
    pub page_size: u32,
    /// Form surface
    pub edit_surface: EditSurface,
    /// Storage dialect
    pub dialect: Dialect,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let options = GenerationOptions::default();
        Self {
            kit: "default".to_string(),
            styling: Some("tailwind".to_string()),
            pagination: options.pagination,
            page_size: options.page_size,
            edit_surface: options.edit_surface,
            dialect: options.dialect,
        }
    }
}

/// Project layout, relative to the project root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// File route registrations are inserted into
    pub composition_root: PathBuf,
    /// Migration directory
    pub migrations_dir: PathBuf,
    /// Shared schema file
    pub schema_file: PathBuf,
    /// Shared query file
    pub queries_file: PathBuf,
    /// Resource registry
    pub registry_file: PathBuf,
    /// Directory holding one module directory per resource
    pub resources_dir: PathBuf,
    /// Project kit overrides
    pub project_kits_dir: PathBuf,
    /// User kit overrides; the XDG location when unset
    pub user_kits_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            composition_root: PathBuf::from("src/main.rs"),
            migrations_dir: PathBuf::from("migrations"),
            schema_file: PathBuf::from("db/schema.sql"),
            queries_file: PathBuf::from("db/queries.sql"),
            registry_file: PathBuf::from(PROJECT_DIR).join("registry.json"),
            resources_dir: PathBuf::from("src"),
            project_kits_dir: PathBuf::from(PROJECT_DIR).join("kits"),
            user_kits_dir: None,
        }
    }
}

/// Marker comments in the composition root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorsConfig {
    /// Closes the module declarations
    pub imports: String,
    /// Route insertion point
    pub routes: String,
}

impl Default for AnchorsConfig {
    fn default() -> Self {
        Self {
            imports: DEFAULT_IMPORTS_ANCHOR.to_string(),
            routes: DEFAULT_ROUTES_ANCHOR.to_string(),
        }
    }
}

/// Template validator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Lines of context around a syntax error
    pub context_lines: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

/// Complete scaffold configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldConfig {
    /// Generation defaults
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Project layout
    #[serde(default)]
    pub paths: PathsConfig,
    /// Composition root markers
    #[serde(default)]
    pub anchors: AnchorsConfig,
    /// Validator settings
    #[serde(default)]
    pub validator: ValidatorConfig,
}

impl ScaffoldConfig {
    /// Load configuration for the project at `project_root`
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be parsed or a value
    /// has the wrong type.
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?));

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                figment = figment.merge(Toml::file(&user_config));
            }
        }

        let project_config = Self::project_config_path(project_root);
        if project_config.exists() {
            figment = figment.merge(Toml::file(&project_config));
        }

        figment = figment.merge(Env::prefixed("ACTON_SCAFFOLD_").split("__").lowercase(true));

        figment.extract().map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Load defaults plus one specific file (no user config, no environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// `~/.config/acton-scaffold/config.toml`, XDG aware
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .filter(|path| path.is_absolute())
            .or_else(dirs::config_dir)?;
        Some(base.join("acton-scaffold").join("config.toml"))
    }

    /// `<project>/.acton/config.toml`
    #[must_use]
    pub fn project_config_path(project_root: &Path) -> PathBuf {
        project_root.join(PROJECT_DIR).join("config.toml")
    }

    /// Generation options seeded from `[defaults]`
    #[must_use]
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            strategy: self.defaults.styling.clone(),
            pagination: self.defaults.pagination,
            page_size: self.defaults.page_size,
            edit_surface: self.defaults.edit_surface,
            dialect: self.defaults.dialect,
            ..GenerationOptions::default()
        }
    }
}
