//! `kit.toml` parsing and validation

use super::KitError;
use crate::styling::StrategyRegistry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Engine the generated application renders UI templates with
pub const TEMPLATE_RUNTIME: &str = "minijinja";

static FIELD_IN_MESSAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:missing|unknown) field `(\w+)`").expect("Invalid regex"));

/// Kit manifest as stored in `kit.toml`
///
/// ```toml
/// name = "default"
/// version = "1.0.0"
/// runtime = "minijinja"
/// style_agnostic = true
/// description = "Server-rendered CRUD with HTMX"
/// tags = ["crud", "htmx"]
/// components = ["pagination", "modal"]
///
/// [supports]
/// resource = true
/// view = true
/// app = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KitManifest {
    /// Kit name, equal to its directory name
    pub name: String,
    /// Semantic version
    pub version: String,
    /// Template engine the generated UI templates are written for
    #[serde(default = "default_runtime")]
    pub runtime: String,
    /// Fixed styling strategy identifier
    #[serde(default)]
    pub styling: Option<String>,
    /// Kit accepts any strategy supplied by the caller
    #[serde(default)]
    pub style_agnostic: bool,
    /// Human description
    #[serde(default)]
    pub description: String,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Component template names (`components/<name>.html`)
    #[serde(default)]
    pub components: Vec<String>,
    /// Generator categories the kit supplies
    #[serde(default)]
    pub supports: KitSupports,
}

/// Generator categories supplied by a kit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitSupports {
    /// Store-backed resources (also covers schema-only generation)
    pub resource: bool,
    /// Store-less views
    pub view: bool,
    /// Whole application skeletons
    pub app: bool,
}

impl Default for KitSupports {
    fn default() -> Self {
        Self {
            resource: true,
            view: true,
            app: false,
        }
    }
}

fn default_runtime() -> String {
    TEMPLATE_RUNTIME.to_string()
}

/// Name the manifest key a TOML or serde failure points at
fn offending_field(source: &str, err: &toml::de::Error) -> String {
    if let Some(caps) = FIELD_IN_MESSAGE.captures(err.message()) {
        return caps[1].to_string();
    }
    err.span()
        .and_then(|span| {
            let before = source.get(..span.start)?;
            let line_start = before.rfind('\n').map_or(0, |i| i + 1);
            let line = source[line_start..].lines().next()?;
            let (key, _) = line.split_once('=')?;
            let key = key.trim();
            (!key.is_empty() && !key.starts_with('[')).then(|| key.to_string())
        })
        .unwrap_or_else(|| "kit.toml".to_string())
}

impl KitManifest {
    /// Parse and validate a manifest found in directory `dir_name`
    ///
    /// # Errors
    ///
    /// Returns [`KitError::InvalidManifest`] naming the offending field when
    /// the TOML is malformed, the name does not match the directory, the
    /// version is not semantic, the template runtime is not minijinja, or the
    /// styling declaration is inconsistent.
    pub fn parse(
        source: &str,
        dir_name: &str,
        strategies: &StrategyRegistry,
    ) -> Result<(Self, semver::Version), KitError> {
        let invalid = |field: &str, reason: String| KitError::InvalidManifest {
            kit: dir_name.to_string(),
            field: field.to_string(),
            reason,
        };

        let manifest: Self = toml::from_str(source)
            .map_err(|e| invalid(&offending_field(source, &e), e.message().to_string()))?;

        if manifest.name != dir_name {
            return Err(invalid(
                "name",
                format!("'{}' does not match directory '{dir_name}'", manifest.name),
            ));
        }

        let version = semver::Version::parse(&manifest.version)
            .map_err(|e| invalid("version", format!("'{}': {e}", manifest.version)))?;

        if manifest.runtime != TEMPLATE_RUNTIME {
            return Err(invalid(
                "runtime",
                format!(
                    "'{}' templates cannot be checked; kits must target {TEMPLATE_RUNTIME}",
                    manifest.runtime
                ),
            ));
        }

        match (&manifest.styling, manifest.style_agnostic) {
            (Some(_), true) => {
                return Err(invalid(
                    "styling",
                    "a kit cannot declare a strategy and be style_agnostic".to_string(),
                ));
            }
            (None, false) => {
                return Err(invalid(
                    "styling",
                    "declare a strategy or set style_agnostic = true".to_string(),
                ));
            }
            (Some(styling), false) if !strategies.contains(styling) => {
                return Err(invalid(
                    "styling",
                    format!(
                        "unknown strategy '{styling}' (available: {})",
                        strategies.names().join(", ")
                    ),
                ));
            }
            _ => {}
        }

        Ok((manifest, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<(KitManifest, semver::Version), KitError> {
        KitManifest::parse(source, "demo", &StrategyRegistry::default())
    }

    fn invalid_field(err: KitError) -> String {
        match err {
            KitError::InvalidManifest { field, .. } => field,
            other => panic!("expected invalid manifest, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_fixed_style() {
        let (manifest, version) = parse(
            r#"
            name = "demo"
            version = "1.2.3"
            styling = "bootstrap"
            components = ["pagination"]
            "#,
        )
        .unwrap();
        assert_eq!(manifest.styling.as_deref(), Some("bootstrap"));
        assert_eq!(version, semver::Version::new(1, 2, 3));
        assert!(manifest.supports.resource);
        assert!(!manifest.supports.app);
    }

    #[test]
    fn test_name_must_match_directory() {
        let err = parse("name = \"other\"\nversion = \"1.0.0\"\nstyle_agnostic = true").unwrap_err();
        assert_eq!(invalid_field(err), "name");
    }

    #[test]
    fn test_version_must_be_semantic() {
        let err = parse("name = \"demo\"\nversion = \"1.0\"\nstyle_agnostic = true").unwrap_err();
        assert_eq!(invalid_field(err), "version");
    }

    #[test]
    fn test_styling_declaration_rules() {
        let err = parse("name = \"demo\"\nversion = \"1.0.0\"").unwrap_err();
        assert_eq!(invalid_field(err), "styling");

        let err = parse("name = \"demo\"\nversion = \"1.0.0\"\nstyling = \"bulma\"").unwrap_err();
        assert_eq!(invalid_field(err), "styling");

        let err = parse(
            "name = \"demo\"\nversion = \"1.0.0\"\nstyling = \"tailwind\"\nstyle_agnostic = true",
        )
        .unwrap_err();
        assert_eq!(invalid_field(err), "styling");
    }

    #[test]
    fn test_missing_required_field_is_named() {
        let err = parse("name = \"demo\"\nstyle_agnostic = true").unwrap_err();
        assert_eq!(invalid_field(err), "version");
    }

    #[test]
    fn test_unknown_and_mistyped_fields_are_named() {
        let err = parse("name = \"demo\"\nversion = \"1.0.0\"\nstyle_agnostic = true\ncolour = \"red\"")
            .unwrap_err();
        assert_eq!(invalid_field(err), "colour");

        let err = parse("name = \"demo\"\nversion = \"1.0.0\"\nstyle_agnostic = \"yes\"").unwrap_err();
        assert_eq!(invalid_field(err), "style_agnostic");
    }

    #[test]
    fn test_malformed_toml_falls_back_to_file() {
        let err = parse("name = \"demo\"\n[supports").unwrap_err();
        assert_eq!(invalid_field(err), "kit.toml");
    }

    #[test]
    fn test_runtime_defaults_to_minijinja() {
        let (manifest, _) = parse("name = \"demo\"\nversion = \"1.0.0\"\nstyle_agnostic = true").unwrap();
        assert_eq!(manifest.runtime, TEMPLATE_RUNTIME);
    }

    #[test]
    fn test_other_runtimes_are_rejected() {
        let err = parse(
            "name = \"demo\"\nversion = \"1.0.0\"\nruntime = \"askama\"\nstyle_agnostic = true",
        )
        .unwrap_err();
        assert_eq!(invalid_field(err), "runtime");
    }

    #[test]
    fn test_supports_partial_table() {
        let (manifest, _) = parse(
            "name = \"demo\"\nversion = \"0.1.0\"\nstyle_agnostic = true\n[supports]\nview = false",
        )
        .unwrap();
        assert!(manifest.supports.resource);
        assert!(!manifest.supports.view);
    }
}
