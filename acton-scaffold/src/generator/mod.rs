//! Resource generation
//!
//! [`Generator::generate`] turns a [`ResourceSpec`] into files on disk:
//!
//! ```text
//! src/<pkg>/mod.rs                      handler
//! src/<pkg>/<pkg>.html                  UI template
//! src/<pkg>/tests.rs                    test scaffold
//! db/schema.sql                         schema fragment (appended)
//! db/queries.sql                        query fragment (appended)
//! migrations/<ts>_create_<table>.sql    migration
//! ```
//!
//! then wires the module into the composition root, records it in the
//! resource registry and checks the UI template parses. Artifacts are written
//! one after another and nothing is rolled back: on error the files written
//! so far stay on disk for inspection.

mod migration;
mod model;
mod output;
mod render;

pub use migration::{find_create_migration, Clock, FixedClock, MigrationFile, SystemClock};
pub use model::{
    EditSurface, GenerationKind, GenerationOptions, PaginationMode, ResourceData, ResourceSpec,
};
pub use output::{GeneratedFile, WriteOutcome};
pub use render::{scaffold_syntax, Renderer};

use crate::config::{PathsConfig, ScaffoldConfig};
use crate::field::FieldError;
use crate::kit::{KitError, KitResolver};
use crate::mutator::{
    AnchorMutator, MutationOutcome, MutationWarning, RegistryEntry, RegistryError,
    ResourceRegistry, RouteDescriptor, RouteMutator,
};
use crate::validator::{TemplateDiagnostic, TemplateValidator};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that stop a generation run
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Kit resolution failed
    #[error(transparent)]
    Kit(#[from] KitError),

    /// A field declaration is invalid
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The kit has no templates for this category
    #[error("kit '{kit}' does not support {kind} generation")]
    Unsupported {
        /// Kit name
        kit: String,
        /// Requested category
        kind: GenerationKind,
    },

    /// The resource name has no usable identifier
    #[error("invalid resource name '{0}'")]
    InvalidName(String),

    /// A store-backed resource was declared without fields
    #[error("no fields are specified for '{0}'")]
    NoFields(String),

    /// Rows per page must be positive when pagination is enabled
    #[error("page size must be at least 1 when pagination is enabled")]
    InvalidPageSize,

    /// Two fields map to the same column
    #[error("naming conflict: column '{0}' is declared more than once")]
    NamingConflict(String),

    /// A kit template failed to parse or render
    #[error("failed to render kit template '{template}': {source}")]
    Render {
        /// Kit template path
        template: String,
        /// Engine error
        #[source]
        source: minijinja::Error,
    },

    /// A file could not be written
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        /// Target path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The resource registry could not be updated
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The generated UI template does not parse (the file is kept)
    #[error("generated template has a syntax error: {0}")]
    TemplateSyntax(Box<TemplateDiagnostic>),
}

/// Everything one run produced
#[derive(Debug)]
pub struct GenerationReport {
    /// Resource package identifier
    pub package: String,
    /// Generator category
    pub kind: GenerationKind,
    /// Kit name
    pub kit: String,
    /// Bound styling strategy
    pub strategy: String,
    /// Artifacts with their outcomes, in write order
    pub files: Vec<GeneratedFile>,
    /// Migration written or skipped, if the category has one
    pub migration: Option<GeneratedFile>,
    /// Composition root changes, when wiring succeeded
    pub mutation: Option<MutationOutcome>,
    /// Whether a registry entry was appended
    pub registered: bool,
    /// Steps the user has to do by hand
    pub warnings: Vec<MutationWarning>,
}

/// Generates resources into one project
#[derive(Debug)]
pub struct Generator {
    root: PathBuf,
    paths: PathsConfig,
    resolver: KitResolver,
    mutator: Box<dyn RouteMutator>,
    validator: TemplateValidator,
    clock: Box<dyn Clock>,
}

impl Generator {
    /// Generator with default configuration
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_config(root, &ScaffoldConfig::default())
    }

    /// Generator honouring `config`
    #[must_use]
    pub fn from_config(root: impl Into<PathBuf>, config: &ScaffoldConfig) -> Self {
        let root = root.into();
        let resolver = KitResolver::new(
            root.join(&config.paths.project_kits_dir),
            config.paths.user_kits_dir.clone(),
        );
        Self {
            root,
            paths: config.paths.clone(),
            resolver,
            mutator: Box::new(AnchorMutator::new(
                config.anchors.imports.clone(),
                config.anchors.routes.clone(),
            )),
            validator: TemplateValidator::new(config.validator.context_lines),
            clock: Box::new(SystemClock),
        }
    }

    /// Use another clock for migration timestamps
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Use another route mutator
    #[must_use]
    pub fn with_mutator(mut self, mutator: impl RouteMutator + 'static) -> Self {
        self.mutator = Box::new(mutator);
        self
    }

    /// Use another kit resolver
    #[must_use]
    pub fn with_resolver(mut self, resolver: KitResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Project root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Kit resolver
    #[must_use]
    pub const fn resolver(&self) -> &KitResolver {
        &self.resolver
    }

    /// Kit resolver, e.g. to add search paths
    pub fn resolver_mut(&mut self) -> &mut KitResolver {
        &mut self.resolver
    }

    /// Generate one resource, view or schema
    ///
    /// # Errors
    ///
    /// Returns the first error encountered. Files written before it stay on
    /// disk. A syntax error in the generated UI template is reported as
    /// [`GenerateError::TemplateSyntax`] after everything has been written.
    #[tracing::instrument(
        skip(self, spec, options),
        fields(resource = %spec.name, kind = %spec.kind, kit = %kit_name)
    )]
    pub fn generate(
        &self,
        spec: &ResourceSpec,
        kit_name: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationReport, GenerateError> {
        let kit = self.resolver.load(kit_name)?;
        if !spec.kind.supported_by(&kit.manifest().supports) {
            return Err(GenerateError::Unsupported {
                kit: kit_name.to_string(),
                kind: spec.kind,
            });
        }
        let kit = kit.bind(options.strategy.as_deref(), self.resolver.strategies())?;
        let data = ResourceData::derive(spec, kit, options)?;
        let mut renderer = Renderer::new(&data, &self.resolver)?;

        let mut report = GenerationReport {
            package: data.package.clone(),
            kind: data.kind,
            kit: data.kit.name().to_string(),
            strategy: data.kit.strategy().name().to_string(),
            files: Vec::new(),
            migration: None,
            mutation: None,
            registered: false,
            warnings: Vec::new(),
        };

        let module_dir = self.paths.resources_dir.join(data.module_dir());
        let prefix = match data.kind {
            GenerationKind::View => "view",
            GenerationKind::Resource | GenerationKind::Schema => "resource",
        };
        let mut ui_template = None;

        if data.kind != GenerationKind::Schema {
            let content = self.render(&mut renderer, &data, &format!("{prefix}/handler.rs"))?;
            report
                .files
                .push(self.write(&module_dir.join("mod.rs"), &content, options.force)?);

            let template_path = module_dir.join(format!("{}.html", data.package));
            let content = self.render(&mut renderer, &data, &format!("{prefix}/template.html"))?;
            let written = self.write(&template_path, &content, options.force)?;
            // A kept file is the user's; the rendered content never reached disk.
            if written.outcome != WriteOutcome::Skipped {
                ui_template = Some((template_path, content));
            }
            report.files.push(written);
        }

        if data.kind != GenerationKind::View {
            let schema = self.render(&mut renderer, &data, "resource/schema.sql")?;
            report.files.push(self.append(&self.paths.schema_file, &schema)?);

            let queries = self.render(&mut renderer, &data, "resource/queries.sql")?;
            report.files.push(self.append(&self.paths.queries_file, &queries)?);

            report.migration = Some(self.write_migration(&mut renderer, &data)?);
        }

        if data.kind != GenerationKind::Schema {
            let content = self.render(&mut renderer, &data, &format!("{prefix}/tests.rs"))?;
            report
                .files
                .push(self.write(&module_dir.join("tests.rs"), &content, options.force)?);
        }

        if let Some(route) = RouteDescriptor::for_resource(&data) {
            let composition_root = self.root.join(&self.paths.composition_root);
            match self.mutator.register(&composition_root, &route) {
                Ok(outcome) => report.mutation = Some(outcome),
                Err(warning) => {
                    tracing::warn!(%warning, "Route needs manual wiring");
                    report.warnings.push(warning);
                }
            }
        }

        let registry = ResourceRegistry::new(self.root.join(&self.paths.registry_file));
        report.registered = registry.record(RegistryEntry {
            name: spec.name.clone(),
            path: match data.kind {
                GenerationKind::Schema => data.table.clone(),
                GenerationKind::Resource | GenerationKind::View => data.route_path.clone(),
            },
            kind: data.kind.registry_kind(),
        })?;

        if let Some((path, content)) = ui_template {
            let display = path.display().to_string();
            self.validator
                .validate(&display, &content)
                .map_err(|diagnostic| GenerateError::TemplateSyntax(Box::new(diagnostic)))?;
        }

        tracing::info!(
            package = %report.package,
            files = report.files.len(),
            "Generation complete"
        );
        Ok(report)
    }

    fn render(
        &self,
        renderer: &mut Renderer,
        data: &ResourceData,
        template: &str,
    ) -> Result<String, GenerateError> {
        let resolved = self.resolver.resolve_template(data.kit.name(), template)?;
        renderer.render(resolved)
    }

    fn write(&self, relative: &Path, content: &str, force: bool) -> Result<GeneratedFile, GenerateError> {
        let path = self.root.join(relative);
        let outcome = output::write_file(&path, content, force).map_err(|source| GenerateError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(self.record(relative, outcome))
    }

    fn append(&self, relative: &Path, fragment: &str) -> Result<GeneratedFile, GenerateError> {
        let path = self.root.join(relative);
        let outcome = output::append_fragment(&path, fragment).map_err(|source| GenerateError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(self.record(relative, outcome))
    }

    fn write_migration(
        &self,
        renderer: &mut Renderer,
        data: &ResourceData,
    ) -> Result<GeneratedFile, GenerateError> {
        let dir = self.root.join(&self.paths.migrations_dir);
        let io_error = |source: std::io::Error| GenerateError::Io {
            path: dir.clone(),
            source,
        };

        if let Some(existing) = find_create_migration(&dir, &data.table).map_err(io_error)? {
            tracing::debug!(path = %existing.display(), "Table already has a create migration");
            let relative = existing
                .strip_prefix(&self.root)
                .map_or_else(|_| existing.clone(), Path::to_path_buf);
            return Ok(GeneratedFile {
                path: relative,
                outcome: WriteOutcome::Skipped,
            });
        }

        let up = self.render(renderer, data, "resource/migration_up.sql")?;
        let down = self.render(renderer, data, "resource/migration_down.sql")?;
        let migration = MigrationFile::sequence(&dir, &data.table, self.clock.as_ref(), up, down)
            .map_err(io_error)?;

        let relative = self.paths.migrations_dir.join(&migration.file_name);
        let path = self.root.join(&relative);
        let outcome = output::create_new(&path, &migration.contents()).map_err(|source| {
            GenerateError::Io {
                path: path.clone(),
                source,
            }
        })?;
        Ok(self.record(&relative, outcome))
    }

    fn record(&self, relative: &Path, outcome: WriteOutcome) -> GeneratedFile {
        match outcome {
            WriteOutcome::Skipped => {
                tracing::warn!(path = %relative.display(), "Existing file differs, left unchanged");
            }
            WriteOutcome::Unchanged => {
                tracing::debug!(path = %relative.display(), %outcome, "Artifact");
            }
            _ => tracing::info!(path = %relative.display(), %outcome, "Artifact written"),
        }
        GeneratedFile {
            path: relative.to_path_buf(),
            outcome,
        }
    }
}
