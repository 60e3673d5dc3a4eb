//! Wiring generated modules into the application
//!
//! The composition root (usually `src/main.rs`) carries two marker
//! comments:
//!
//! ```rust,ignore
//! mod home;
//! // acton:end-mods
//!
//! let app = Router::new()
//!     .merge(home::router())
//!     // acton:routes
//!     .with_state(state);
//! ```
//!
//! [`AnchorMutator`] inserts `mod <pkg>;` before the first marker and the
//! route registration before the second, each only when an identical line is
//! not there yet. Running it twice leaves the file byte-identical.

mod registry;

pub use registry::{RegistryEntry, RegistryError, RegistryKind, ResourceRegistry};

use crate::generator::{GenerationKind, ResourceData};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default marker closing the module declarations
pub const DEFAULT_IMPORTS_ANCHOR: &str = "// acton:end-mods";

/// Default marker where route registrations are inserted
pub const DEFAULT_ROUTES_ANCHOR: &str = "// acton:routes";

/// How a generated module is mounted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// URL path (`/posts`)
    pub path: String,
    /// Package identifier (`post`)
    pub package: String,
    /// Handler construction expression (`post::router(pool.clone())`)
    pub handler: String,
    /// Module path declared in the composition root
    pub import: String,
}

impl RouteDescriptor {
    /// Route for a generated resource or view; `None` for schema-only runs
    #[must_use]
    pub fn for_resource(data: &ResourceData) -> Option<Self> {
        let handler = match data.kind {
            GenerationKind::Resource => format!("{}::router(pool.clone())", data.package),
            GenerationKind::View => format!("{}::router()", data.package),
            GenerationKind::Schema => return None,
        };
        Some(Self {
            path: data.route_path.clone(),
            package: data.package.clone(),
            handler,
            import: data.package.clone(),
        })
    }

    /// Module declaration line
    #[must_use]
    pub fn import_line(&self) -> String {
        format!("mod {};", self.import)
    }

    /// Router registration line
    #[must_use]
    pub fn registration_line(&self) -> String {
        if self.path == "/" {
            format!(".merge({})", self.handler)
        } else {
            format!(".nest(\"{}\", {})", self.path, self.handler)
        }
    }

    fn manual_steps(&self) -> String {
        format!(
            "add `{}` to the module declarations and `{}` to the router",
            self.import_line(),
            self.registration_line()
        )
    }
}

/// Lines inserted by one mutation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    /// Module declaration was inserted
    pub import_added: bool,
    /// Route registration was inserted
    pub route_added: bool,
}

impl MutationOutcome {
    /// Whether the file changed
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.import_added || self.route_added
    }
}

/// Non-fatal problem wiring a route; the user has to finish by hand
#[derive(Debug, Error)]
pub enum MutationWarning {
    /// The composition root does not exist
    #[error("{} not found; {instructions}", .path.display())]
    MissingFile {
        /// Composition root
        path: PathBuf,
        /// Manual wiring steps
        instructions: String,
    },

    /// An anchor comment is absent
    #[error("anchor `{anchor}` not found in {}; {instructions}", .path.display())]
    MissingAnchor {
        /// Composition root
        path: PathBuf,
        /// Missing anchor
        anchor: String,
        /// Manual wiring steps
        instructions: String,
    },

    /// An anchor comment appears more than once
    #[error("anchor `{anchor}` appears {count} times in {}; {instructions}", .path.display())]
    DuplicateAnchor {
        /// Composition root
        path: PathBuf,
        /// Duplicated anchor
        anchor: String,
        /// Occurrences
        count: usize,
        /// Manual wiring steps
        instructions: String,
    },

    /// The composition root could not be read or written
    #[error("failed to update {}: {source}; {instructions}", .path.display())]
    Io {
        /// Composition root
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
        /// Manual wiring steps
        instructions: String,
    },
}

impl MutationWarning {
    /// Manual wiring steps
    #[must_use]
    pub fn instructions(&self) -> &str {
        match self {
            Self::MissingFile { instructions, .. }
            | Self::MissingAnchor { instructions, .. }
            | Self::DuplicateAnchor { instructions, .. }
            | Self::Io { instructions, .. } => instructions,
        }
    }
}

/// Registers routes in the composition root
///
/// The anchor-based implementation edits text; an AST-based one can be
/// swapped in through this trait.
pub trait RouteMutator: Send + Sync + fmt::Debug {
    /// Wire `route` into the file at `composition_root`
    ///
    /// # Errors
    ///
    /// Returns a [`MutationWarning`] when the file cannot be updated
    /// automatically. Nothing is written in that case.
    fn register(
        &self,
        composition_root: &Path,
        route: &RouteDescriptor,
    ) -> Result<MutationOutcome, MutationWarning>;
}

/// Comment-anchor mutator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorMutator {
    imports_anchor: String,
    routes_anchor: String,
}

impl Default for AnchorMutator {
    fn default() -> Self {
        Self::new(DEFAULT_IMPORTS_ANCHOR, DEFAULT_ROUTES_ANCHOR)
    }
}

impl AnchorMutator {
    /// Mutator using custom anchor comments
    #[must_use]
    pub fn new(imports_anchor: impl Into<String>, routes_anchor: impl Into<String>) -> Self {
        Self {
            imports_anchor: imports_anchor.into(),
            routes_anchor: routes_anchor.into(),
        }
    }

    /// Apply the mutation to `source` in memory
    ///
    /// `path` is used in warnings only.
    ///
    /// # Errors
    ///
    /// Returns a [`MutationWarning`] when an anchor is missing or duplicated.
    pub fn apply(
        &self,
        source: &str,
        path: &Path,
        route: &RouteDescriptor,
    ) -> Result<(String, MutationOutcome), MutationWarning> {
        let mut lines: Vec<String> = source.lines().map(ToString::to_string).collect();
        let imports_at = self.find_anchor(&lines, &self.imports_anchor, path, route)?;
        let routes_at = self.find_anchor(&lines, &self.routes_anchor, path, route)?;

        let mut insertions = Vec::new();
        let mut outcome = MutationOutcome::default();

        let import = route.import_line();
        if contains_line(&lines, &import) {
            tracing::debug!(line = %import, "Module already declared, skipping");
        } else {
            insertions.push((imports_at, indented(&lines[imports_at], &import)));
            outcome.import_added = true;
        }

        let registration = route.registration_line();
        if contains_line(&lines, &registration) {
            tracing::debug!(line = %registration, "Route already registered, skipping");
        } else {
            insertions.push((routes_at, indented(&lines[routes_at], &registration)));
            outcome.route_added = true;
        }

        if !outcome.changed() {
            return Ok((source.to_string(), outcome));
        }

        // Insert bottom-up so earlier indices stay valid.
        insertions.sort_by(|a, b| b.0.cmp(&a.0));
        for (at, line) in insertions {
            lines.insert(at, line);
        }

        let mut updated = lines.join("\n");
        if source.ends_with('\n') {
            updated.push('\n');
        }
        Ok((updated, outcome))
    }

    fn find_anchor(
        &self,
        lines: &[String],
        anchor: &str,
        path: &Path,
        route: &RouteDescriptor,
    ) -> Result<usize, MutationWarning> {
        let hits: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.trim() == anchor)
            .map(|(index, _)| index)
            .collect();
        match hits.as_slice() {
            [index] => Ok(*index),
            [] => Err(MutationWarning::MissingAnchor {
                path: path.to_path_buf(),
                anchor: anchor.to_string(),
                instructions: route.manual_steps(),
            }),
            _ => Err(MutationWarning::DuplicateAnchor {
                path: path.to_path_buf(),
                anchor: anchor.to_string(),
                count: hits.len(),
                instructions: route.manual_steps(),
            }),
        }
    }
}

impl RouteMutator for AnchorMutator {
    fn register(
        &self,
        composition_root: &Path,
        route: &RouteDescriptor,
    ) -> Result<MutationOutcome, MutationWarning> {
        let io_warning = |source: std::io::Error| MutationWarning::Io {
            path: composition_root.to_path_buf(),
            source,
            instructions: route.manual_steps(),
        };

        if !composition_root.is_file() {
            return Err(MutationWarning::MissingFile {
                path: composition_root.to_path_buf(),
                instructions: route.manual_steps(),
            });
        }

        let source = std::fs::read_to_string(composition_root).map_err(io_warning)?;
        let (updated, outcome) = self.apply(&source, composition_root, route)?;
        if outcome.changed() {
            std::fs::write(composition_root, updated).map_err(io_warning)?;
            tracing::info!(
                path = %composition_root.display(),
                route = %route.path,
                "Registered route"
            );
        }
        Ok(outcome)
    }
}

fn contains_line(lines: &[String], candidate: &str) -> bool {
    let candidate = candidate.trim();
    lines.iter().any(|line| {
        let line = line.trim();
        !line.starts_with("//") && line == candidate
    })
}

fn indented(anchor_line: &str, text: &str) -> String {
    let indent: String = anchor_line
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect();
    format!("{indent}{text}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MAIN: &str = "mod home;\n// acton:end-mods\n\nfn app() -> Router {\n    Router::new()\n        .merge(home::router())\n        // acton:routes\n}\n";

    fn post_route() -> RouteDescriptor {
        RouteDescriptor {
            path: "/posts".to_string(),
            package: "post".to_string(),
            handler: "post::router(pool.clone())".to_string(),
            import: "post".to_string(),
        }
    }

    #[test]
    fn test_inserts_before_anchors_with_indentation() {
        let (updated, outcome) = AnchorMutator::default()
            .apply(MAIN, Path::new("src/main.rs"), &post_route())
            .unwrap();
        assert!(outcome.import_added && outcome.route_added);
        assert_eq!(
            updated,
            "mod home;\nmod post;\n// acton:end-mods\n\nfn app() -> Router {\n    Router::new()\n        .merge(home::router())\n        .nest(\"/posts\", post::router(pool.clone()))\n        // acton:routes\n}\n"
        );
    }

    #[test]
    fn test_second_run_is_byte_identical() {
        let mutator = AnchorMutator::default();
        let (once, _) = mutator.apply(MAIN, Path::new("main.rs"), &post_route()).unwrap();
        let (twice, outcome) = mutator.apply(&once, Path::new("main.rs"), &post_route()).unwrap();
        assert_eq!(once, twice);
        assert!(!outcome.changed());
    }

    #[test]
    fn test_commented_line_does_not_count() {
        let source = "// mod post;\n// acton:end-mods\n// acton:routes\n";
        let (updated, outcome) = AnchorMutator::default()
            .apply(source, Path::new("main.rs"), &post_route())
            .unwrap();
        assert!(outcome.import_added);
        assert!(updated.contains("\nmod post;\n"));
    }

    #[test]
    fn test_root_path_merges() {
        let route = RouteDescriptor {
            path: "/".to_string(),
            package: "home".to_string(),
            handler: "home::router()".to_string(),
            import: "home".to_string(),
        };
        assert_eq!(route.registration_line(), ".merge(home::router())");
        assert_eq!(route.import_line(), "mod home;");
    }

    #[test]
    fn test_missing_anchor_warns_without_changes() {
        let source = "mod home;\n// acton:end-mods\nfn main() {}\n";
        let err = AnchorMutator::default()
            .apply(source, Path::new("src/main.rs"), &post_route())
            .unwrap_err();
        assert!(matches!(&err, MutationWarning::MissingAnchor { anchor, .. } if anchor == DEFAULT_ROUTES_ANCHOR));
        assert!(err.instructions().contains(".nest(\"/posts\", post::router(pool.clone()))"));
        assert!(err.instructions().contains("mod post;"));
    }

    #[test]
    fn test_duplicate_anchor_warns() {
        let source = "// acton:end-mods\n// acton:end-mods\n// acton:routes\n";
        let err = AnchorMutator::default()
            .apply(source, Path::new("src/main.rs"), &post_route())
            .unwrap_err();
        assert!(matches!(err, MutationWarning::DuplicateAnchor { count: 2, .. }));
    }

    #[test]
    fn test_register_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = AnchorMutator::default()
            .register(&temp.path().join("src/main.rs"), &post_route())
            .unwrap_err();
        assert!(matches!(err, MutationWarning::MissingFile { .. }));
    }

    proptest! {
        #[test]
        fn prop_mutation_is_idempotent(package in "[a-z]{1,12}", indent in 0usize..8) {
            let source = format!(
                "// acton:end-mods\nfn app() {{\n{}// acton:routes\n}}\n",
                " ".repeat(indent)
            );
            let route = RouteDescriptor {
                path: format!("/{package}s"),
                package: package.clone(),
                handler: format!("{package}::router()"),
                import: package,
            };
            let mutator = AnchorMutator::default();
            let (once, first) = mutator.apply(&source, Path::new("main.rs"), &route).unwrap();
            let (twice, second) = mutator.apply(&once, Path::new("main.rs"), &route).unwrap();
            prop_assert!(first.changed());
            prop_assert!(!second.changed());
            prop_assert_eq!(once, twice);
        }
    }
}
