//! Generation input and the derived naming bundle

use super::GenerateError;
use crate::field::{Dialect, FieldData, FieldSpec};
use crate::kit::{KitInfo, KitSupports};
use crate::mutator::RegistryKind;
use crate::naming::Naming;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Generator category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    /// Store-backed CRUD slice
    Resource,
    /// Store-less page
    View,
    /// Storage artifacts only
    Schema,
}

impl GenerationKind {
    /// Whether a kit's `[supports]` table covers this category
    #[must_use]
    pub const fn supported_by(self, supports: &KitSupports) -> bool {
        match self {
            Self::Resource | Self::Schema => supports.resource,
            Self::View => supports.view,
        }
    }

    /// Registry entry kind
    #[must_use]
    pub const fn registry_kind(self) -> RegistryKind {
        match self {
            Self::Resource => RegistryKind::Resource,
            Self::View => RegistryKind::View,
            Self::Schema => RegistryKind::Schema,
        }
    }
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource => write!(f, "resource"),
            Self::View => write!(f, "view"),
            Self::Schema => write!(f, "schema"),
        }
    }
}

/// How list pages are paginated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    /// Render every row
    None,
    /// `?page=N` with LIMIT/OFFSET
    #[default]
    Offset,
    /// `?after=<id>` keyset pagination
    Cursor,
}

/// Where create/edit forms are shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditSurface {
    /// Inline modal over the list
    #[default]
    Modal,
    /// Dedicated page
    Page,
}

/// Options for one generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Styling strategy for style-agnostic kits
    pub strategy: Option<String>,
    /// Pagination mode
    pub pagination: PaginationMode,
    /// Rows per page
    pub page_size: u32,
    /// Form surface
    pub edit_surface: EditSurface,
    /// Storage dialect
    pub dialect: Dialect,
    /// Overwrite existing per-resource files that differ
    pub force: bool,
    /// Route path override (defaults to the kebab-case plural)
    pub route: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            strategy: None,
            pagination: PaginationMode::default(),
            page_size: 25,
            edit_surface: EditSurface::default(),
            dialect: Dialect::default(),
            force: false,
            route: None,
        }
    }
}

impl GenerationOptions {
    /// Set the styling strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }
}

/// What to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Resource name as typed (`BlogPost`, `blog_post`, `blog-posts`)
    pub name: String,
    /// Ordered field declarations
    pub fields: Vec<FieldSpec>,
    /// Generator category
    pub kind: GenerationKind,
}

impl ResourceSpec {
    /// Store-backed resource
    #[must_use]
    pub fn resource(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            fields,
            kind: GenerationKind::Resource,
        }
    }

    /// Store-less view
    #[must_use]
    pub fn view(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            kind: GenerationKind::View,
        }
    }

    /// Storage artifacts only
    #[must_use]
    pub fn schema(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            fields,
            kind: GenerationKind::Schema,
        }
    }

    /// Build from `(field_name, explicit_type)` pairs; an empty type means infer
    #[must_use]
    pub fn from_pairs<'a>(
        name: impl Into<String>,
        kind: GenerationKind,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            name: name.into(),
            fields: pairs
                .into_iter()
                .map(|(field, ty)| FieldSpec::new(field, Some(ty)))
                .collect(),
            kind,
        }
    }
}

/// Derived naming bundle plus everything templates render from
#[derive(Debug, Clone, Serialize)]
pub struct ResourceData {
    /// Resource name as typed
    pub name: String,
    /// Generator category
    pub kind: GenerationKind,
    /// Module name (`blog_post`)
    pub package: String,
    /// Singular type identifier (`BlogPost`)
    pub singular: String,
    /// Plural type identifier (`BlogPosts`)
    pub plural: String,
    /// Singular display form (`Blog Post`)
    pub singular_title: String,
    /// Plural display form (`Blog Posts`)
    pub plural_title: String,
    /// Storage table (`blog_posts`)
    pub table: String,
    /// URL path (`/blog-posts`)
    pub route_path: String,
    /// Resolved fields
    pub fields: Vec<FieldData>,
    /// Bound kit
    pub kit: KitInfo,
    /// Options
    pub options: GenerationOptions,
    /// Whether list pages paginate
    pub paginated: bool,
    /// Whether forms use the modal surface
    pub modal: bool,
    /// Whether any field is a reference
    pub has_references: bool,
}

impl ResourceData {
    /// Derive naming forms and resolve fields
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidName`] for a name without letters,
    /// [`GenerateError::NoFields`] for a resource or schema without fields,
    /// [`GenerateError::InvalidPageSize`] for a zero page size with pagination
    /// enabled, [`GenerateError::NamingConflict`] when two fields share a
    /// column, and field resolution errors.
    pub fn derive(
        spec: &ResourceSpec,
        kit: KitInfo,
        options: &GenerationOptions,
    ) -> Result<Self, GenerateError> {
        let snake = Naming::to_snake_case(spec.name.trim());
        if !snake.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(GenerateError::InvalidName(spec.name.clone()));
        }
        if spec.kind != GenerationKind::View && spec.fields.is_empty() {
            return Err(GenerateError::NoFields(spec.name.clone()));
        }
        if options.pagination != PaginationMode::None && options.page_size == 0 {
            return Err(GenerateError::InvalidPageSize);
        }

        // Views keep their name as typed; store-backed kinds are singular.
        let package = match spec.kind {
            GenerationKind::View => snake,
            GenerationKind::Resource | GenerationKind::Schema => Naming::to_package_name(&snake),
        };
        let table = Naming::to_table_name(&package);

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(spec.fields.len());
        for field in &spec.fields {
            let data = field.resolve(options.dialect)?;
            if data.column == "id" || !seen.insert(data.column.clone()) {
                return Err(GenerateError::NamingConflict(data.column));
            }
            fields.push(data);
        }

        let route_path = options.route.clone().unwrap_or_else(|| match spec.kind {
            GenerationKind::View => format!("/{}", Naming::to_kebab_case(&package)),
            GenerationKind::Resource | GenerationKind::Schema => Naming::to_route_path(&package),
        });

        let plural_snake = Naming::pluralize(&package);
        Ok(Self {
            name: spec.name.clone(),
            kind: spec.kind,
            singular: Naming::to_identifier_case(&package),
            plural: Naming::to_identifier_case(&plural_snake),
            singular_title: Naming::to_title(&package),
            plural_title: Naming::to_title(&plural_snake),
            has_references: fields.iter().any(|f| f.foreign_key.is_some()),
            paginated: options.pagination != PaginationMode::None,
            modal: options.edit_surface == EditSurface::Modal,
            package,
            table,
            route_path,
            fields,
            kit,
            options: options.clone(),
        })
    }

    /// Directory the per-resource files land in, relative to the resources root
    #[must_use]
    pub fn module_dir(&self) -> PathBuf {
        PathBuf::from(&self.package)
    }
}
