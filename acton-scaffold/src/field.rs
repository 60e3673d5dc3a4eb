//! Field specifications and their resolved types
//!
//! A [`FieldSpec`] is what the caller hands in: a name, an optional explicit
//! type, and modifiers. [`FieldSpec::resolve`] turns it into a [`FieldData`]
//! carrying the in-memory (Rust) type, the storage (SQL) type for a dialect,
//! and foreign-key metadata for references.
//!
//! # Input format
//!
//! ```text
//! title                     → inferred from the name (string)
//! title:string              → String
//! body:text                 → String (TEXT column)
//! age:int:optional          → Option<i32>
//! email:string:unique       → String (with unique constraint)
//! author:references:User    → author_id, foreign key to users(id)
//! owner:references:User:set_null:optional
//! published_at:timestamp:indexed
//! ```
//!
//! An explicit type always overrides inference from the name.

use crate::naming::{Naming, SemanticType};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while parsing or resolving a field
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// The field name is empty or not a valid identifier
    #[error("invalid field name '{0}': must start with a letter and contain only letters, digits and underscores")]
    InvalidName(String),

    /// The explicit type is not part of the supported vocabulary
    #[error("unknown field type '{ty}' for field '{field}'. Supported types: string, text, int, bigint, float, decimal, bool, timestamp, date, uuid, json, references:Model")]
    UnknownType {
        /// Field name
        field: String,
        /// Offending type text
        ty: String,
    },

    /// `references:` was given without a model name
    #[error("reference field '{0}' must name the referenced model (references:Model)")]
    MissingReference(String),

    /// The referenced model is not a valid identifier
    #[error("reference field '{field}' names an invalid model '{model}'")]
    InvalidReference {
        /// Field name
        field: String,
        /// Offending model text
        model: String,
    },

    /// A modifier that is not recognised
    #[error("unknown modifier '{modifier}' on field '{field}'. Valid modifiers: optional, unique, indexed, cascade, set_null, restrict")]
    UnknownModifier {
        /// Field name
        field: String,
        /// Offending modifier
        modifier: String,
    },

    /// A delete policy on a field that is not a reference
    #[error("delete policy on field '{0}' requires a references:Model type")]
    PolicyWithoutReference(String),

    /// `SET NULL` needs a nullable column
    #[error("field '{0}' uses on-delete set_null and must be marked optional")]
    SetNullRequiresOptional(String),
}

/// Database dialect the storage types are rendered for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `SQLite` (default)
    #[default]
    Sqlite,
    /// `PostgreSQL`
    Postgres,
}

/// Foreign key delete policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDelete {
    /// Delete dependent rows
    Cascade,
    /// Null out the referencing column
    SetNull,
    /// Refuse to delete referenced rows (default)
    #[default]
    Restrict,
}

impl OnDelete {
    /// SQL clause keyword
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::Restrict => "RESTRICT",
        }
    }

    fn parse(modifier: &str) -> Option<Self> {
        match modifier {
            "cascade" => Some(Self::Cascade),
            "set_null" | "setnull" | "nullify" => Some(Self::SetNull),
            "restrict" => Some(Self::Restrict),
            _ => None,
        }
    }
}

/// Resolved field type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Short string (VARCHAR)
    String,
    /// Text (unlimited length)
    Text,
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    BigInt,
    /// 64-bit float
    Float,
    /// Decimal number
    Decimal,
    /// Boolean
    Boolean,
    /// Date (no time)
    Date,
    /// Timestamp (with timezone)
    Timestamp,
    /// UUID
    Uuid,
    /// JSON value
    Json,
    /// Foreign key reference to another model
    Reference {
        /// Referenced model name (e.g., "User")
        model: String,
    },
}

impl FieldType {
    fn parse(type_str: &str, field_name: &str) -> Result<Self, FieldError> {
        let trimmed = type_str.trim();
        let reference = ["references", "belongs_to"].iter().find_map(|keyword| {
            trimmed
                .get(..keyword.len())
                .filter(|prefix| prefix.eq_ignore_ascii_case(keyword))
                .and_then(|_| trimmed.get(keyword.len()..))
                .filter(|rest| rest.is_empty() || rest.starts_with(':'))
        });
        if let Some(rest) = reference {
            let model = rest.trim_start_matches(':').trim();
            if model.is_empty() {
                return Err(FieldError::MissingReference(field_name.to_string()));
            }
            if !is_identifier(model) {
                return Err(FieldError::InvalidReference {
                    field: field_name.to_string(),
                    model: model.to_string(),
                });
            }
            return Ok(Self::Reference {
                model: model.to_string(),
            });
        }

        let lower = trimmed.to_lowercase();
        match lower.as_str() {
            "string" | "str" => Ok(Self::String),
            "text" => Ok(Self::Text),
            "int" | "integer" | "i32" => Ok(Self::Integer),
            "bigint" | "i64" => Ok(Self::BigInt),
            "float" | "double" | "f32" | "f64" => Ok(Self::Float),
            "decimal" => Ok(Self::Decimal),
            "bool" | "boolean" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            "timestamp" | "datetime" | "time" => Ok(Self::Timestamp),
            "uuid" => Ok(Self::Uuid),
            "json" | "jsonb" => Ok(Self::Json),
            _ => Err(FieldError::UnknownType {
                field: field_name.to_string(),
                ty: type_str.to_string(),
            }),
        }
    }

    /// Rust type used by generated handlers
    #[must_use]
    pub fn rust_type(&self) -> &'static str {
        match self {
            Self::String | Self::Text => "String",
            Self::Integer => "i32",
            Self::BigInt | Self::Reference { .. } => "i64",
            Self::Float => "f64",
            Self::Decimal => "rust_decimal::Decimal",
            Self::Boolean => "bool",
            Self::Date => "chrono::NaiveDate",
            Self::Timestamp => "chrono::DateTime<chrono::Utc>",
            Self::Uuid => "uuid::Uuid",
            Self::Json => "serde_json::Value",
        }
    }

    /// Storage type for the given dialect
    #[must_use]
    pub fn sql_type(&self, dialect: Dialect) -> &'static str {
        match dialect {
            Dialect::Sqlite => match self {
                Self::String | Self::Text | Self::Uuid | Self::Json => "TEXT",
                Self::Integer | Self::BigInt | Self::Reference { .. } => "INTEGER",
                Self::Float => "REAL",
                Self::Decimal => "NUMERIC",
                Self::Boolean => "BOOLEAN",
                Self::Date => "DATE",
                Self::Timestamp => "TIMESTAMP",
            },
            Dialect::Postgres => match self {
                Self::String => "VARCHAR(255)",
                Self::Text => "TEXT",
                Self::Integer => "INTEGER",
                Self::BigInt | Self::Reference { .. } => "BIGINT",
                Self::Float => "DOUBLE PRECISION",
                Self::Decimal => "DECIMAL(19,4)",
                Self::Boolean => "BOOLEAN",
                Self::Date => "DATE",
                Self::Timestamp => "TIMESTAMP WITH TIME ZONE",
                Self::Uuid => "UUID",
                Self::Json => "JSONB",
            },
        }
    }

    /// HTML input type for generated forms
    #[must_use]
    pub const fn input_type(&self) -> &'static str {
        match self {
            Self::String | Self::Uuid => "text",
            Self::Text | Self::Json => "textarea",
            Self::Integer | Self::BigInt | Self::Reference { .. } => "number",
            Self::Float | Self::Decimal => "decimal",
            Self::Boolean => "checkbox",
            Self::Date => "date",
            Self::Timestamp => "datetime-local",
        }
    }

    /// Rust expression producing a sample value, used by generated tests
    #[must_use]
    pub fn sample_value(&self) -> String {
        match self {
            Self::String | Self::Text => "\"test\".to_string()".to_string(),
            Self::Integer | Self::BigInt | Self::Reference { .. } => "1".to_string(),
            Self::Float => "1.5".to_string(),
            Self::Decimal => "rust_decimal::Decimal::ONE".to_string(),
            Self::Boolean => "true".to_string(),
            Self::Date => "chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()".to_string(),
            Self::Timestamp => "chrono::Utc::now()".to_string(),
            Self::Uuid => "uuid::Uuid::new_v4()".to_string(),
            Self::Json => "serde_json::json!({})".to_string(),
        }
    }
}

impl From<SemanticType> for FieldType {
    fn from(semantic: SemanticType) -> Self {
        match semantic {
            SemanticType::String => Self::String,
            SemanticType::Int => Self::Integer,
            SemanticType::Float => Self::Float,
            SemanticType::Bool => Self::Boolean,
            SemanticType::Timestamp => Self::Timestamp,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "int"),
            Self::BigInt => write!(f, "bigint"),
            Self::Float => write!(f, "float"),
            Self::Decimal => write!(f, "decimal"),
            Self::Boolean => write!(f, "bool"),
            Self::Date => write!(f, "date"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Uuid => write!(f, "uuid"),
            Self::Json => write!(f, "json"),
            Self::Reference { model } => write!(f, "references:{model}"),
        }
    }
}

/// A field as declared by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name (e.g., "title", "`published_at`")
    pub name: String,
    /// Explicit type text; `None` means infer from the name
    pub explicit_type: Option<String>,
    /// Whether the column is nullable
    pub optional: bool,
    /// Whether the column has a unique constraint
    pub unique: bool,
    /// Whether the column is indexed
    pub indexed: bool,
    /// Delete policy for references
    pub on_delete: Option<OnDelete>,
}

impl FieldSpec {
    /// Create a field from a name and an optional explicit type
    ///
    /// An empty type string is treated the same as `None`.
    #[must_use]
    pub fn new(name: impl Into<String>, explicit_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            explicit_type: explicit_type
                .map(str::trim)
                .filter(|ty| !ty.is_empty())
                .map(ToString::to_string),
            ..Self::default()
        }
    }

    /// Parse a field definition from a string
    ///
    /// Format: `name[:type][:modifier]*`
    ///
    /// # Examples
    ///
    /// ```
    /// # use acton_scaffold::field::FieldSpec;
    /// let field = FieldSpec::parse("title:string").unwrap();
    /// assert_eq!(field.name, "title");
    /// assert_eq!(field.explicit_type.as_deref(), Some("string"));
    ///
    /// let field = FieldSpec::parse("created_at").unwrap();
    /// assert!(field.explicit_type.is_none());
    ///
    /// let field = FieldSpec::parse("email:string:unique:indexed").unwrap();
    /// assert!(field.unique);
    /// assert!(field.indexed);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid identifier or a modifier
    /// is unknown. The type itself is validated by [`FieldSpec::resolve`].
    pub fn parse(input: &str) -> Result<Self, FieldError> {
        let parts: Vec<&str> = input.split(':').map(str::trim).collect();
        let name = parts.first().copied().unwrap_or_default();
        validate_name(name)?;

        // Type text runs until the first modifier keyword; it may itself
        // contain colons (references:User).
        let type_end = parts
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, part)| is_modifier(part))
            .map_or(parts.len(), |(idx, _)| idx);
        let type_str = parts[1..type_end].join(":");

        let mut spec = Self::new(name, Some(&type_str));
        for modifier in &parts[type_end..] {
            match modifier.to_lowercase().as_str() {
                "optional" | "nullable" => spec.optional = true,
                "unique" => spec.unique = true,
                "indexed" | "index" => spec.indexed = true,
                other => {
                    let policy = OnDelete::parse(other).ok_or_else(|| FieldError::UnknownModifier {
                        field: name.to_string(),
                        modifier: (*modifier).to_string(),
                    })?;
                    spec.on_delete = Some(policy);
                }
            }
        }
        Ok(spec)
    }

    /// Resolve the declared field into its full type information
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit type is unknown, a delete policy is
    /// attached to a non-reference, or `set_null` is used on a required field.
    pub fn resolve(&self, dialect: Dialect) -> Result<FieldData, FieldError> {
        validate_name(&self.name)?;
        let name = Naming::to_snake_case(&self.name);

        let (field_type, inferred) = match &self.explicit_type {
            Some(ty) => (FieldType::parse(ty, &name)?, false),
            None => (FieldType::from(Naming::infer_type(&name)), true),
        };

        let foreign_key = match &field_type {
            FieldType::Reference { model } => {
                let on_delete = self.on_delete.unwrap_or_default();
                if on_delete == OnDelete::SetNull && !self.optional {
                    return Err(FieldError::SetNullRequiresOptional(name));
                }
                Some(ForeignKey {
                    table: Naming::to_table_name(model),
                    column: "id".to_string(),
                    on_delete,
                })
            }
            _ if self.on_delete.is_some() => {
                return Err(FieldError::PolicyWithoutReference(name));
            }
            _ => None,
        };

        let column = if foreign_key.is_some() {
            Naming::to_foreign_key(&name)
        } else {
            name.clone()
        };
        let base_rust = field_type.rust_type();
        let rust_type = if self.optional {
            format!("Option<{base_rust}>")
        } else {
            base_rust.to_string()
        };

        Ok(FieldData {
            label: Naming::to_title(&name),
            name,
            column,
            type_name: field_type.to_string(),
            rust_type,
            sql_type: field_type.sql_type(dialect).to_string(),
            input_type: field_type.input_type().to_string(),
            sample_value: field_type.sample_value(),
            inferred,
            optional: self.optional,
            unique: self.unique,
            indexed: self.indexed,
            foreign_key,
            field_type,
        })
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(ty) = &self.explicit_type {
            write!(f, ":{ty}")?;
        }
        if self.optional {
            write!(f, ":optional")?;
        }
        if self.unique {
            write!(f, ":unique")?;
        }
        if self.indexed {
            write!(f, ":indexed")?;
        }
        if let Some(policy) = self.on_delete {
            let keyword = match policy {
                OnDelete::Cascade => "cascade",
                OnDelete::SetNull => "set_null",
                OnDelete::Restrict => "restrict",
            };
            write!(f, ":{keyword}")?;
        }
        Ok(())
    }
}

/// Foreign key metadata for a reference field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    /// Referenced table (never empty)
    pub table: String,
    /// Referenced column
    pub column: String,
    /// Delete policy
    pub on_delete: OnDelete,
}

/// A fully resolved field, serialized into the template context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldData {
    /// Field name in `snake_case`
    pub name: String,
    /// Column name (`author_id` for a reference named `author`)
    pub column: String,
    /// Human-readable label
    pub label: String,
    /// Type name as written in field specs
    pub type_name: String,
    /// In-memory type
    pub rust_type: String,
    /// Storage type
    pub sql_type: String,
    /// HTML input type
    pub input_type: String,
    /// Sample value expression for generated tests
    pub sample_value: String,
    /// Whether the type was inferred from the name
    pub inferred: bool,
    /// Nullable column
    pub optional: bool,
    /// Unique constraint
    pub unique: bool,
    /// Indexed column
    pub indexed: bool,
    /// Foreign key metadata for references
    pub foreign_key: Option<ForeignKey>,
    #[serde(skip)]
    /// Resolved type
    pub field_type: FieldType,
}

fn is_identifier(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_name(name: &str) -> Result<(), FieldError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(FieldError::InvalidName(name.to_string()))
    }
}

fn is_modifier(part: &str) -> bool {
    matches!(
        part.to_lowercase().as_str(),
        "optional" | "nullable" | "unique" | "indexed" | "index"
    ) || OnDelete::parse(&part.to_lowercase()).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(input: &str) -> FieldData {
        FieldSpec::parse(input).unwrap().resolve(Dialect::Sqlite).unwrap()
    }

    #[test]
    fn test_parse_simple_string() {
        let field = resolve("title:string");
        assert_eq!(field.name, "title");
        assert_eq!(field.field_type, FieldType::String);
        assert!(!field.optional);
        assert!(!field.inferred);
        assert_eq!(field.rust_type, "String");
        assert_eq!(field.sql_type, "TEXT");
    }

    #[test]
    fn test_inferred_type_when_type_omitted() {
        let field = resolve("created_at");
        assert!(field.inferred);
        assert_eq!(field.field_type, FieldType::Timestamp);

        let field = resolve("is_active");
        assert_eq!(field.field_type, FieldType::Boolean);
        assert_eq!(field.input_type, "checkbox");
    }

    #[test]
    fn test_explicit_type_overrides_inference() {
        let field = resolve("created_at:string");
        assert_eq!(field.field_type, FieldType::String);
        assert!(!field.inferred);

        let field = FieldSpec::new("unit_price", Some("int"))
            .resolve(Dialect::Sqlite)
            .unwrap();
        assert_eq!(field.field_type, FieldType::Integer);
    }

    #[test]
    fn test_empty_explicit_type_means_inferred() {
        let field = FieldSpec::new("unit_price", Some("")).resolve(Dialect::Sqlite).unwrap();
        assert!(field.inferred);
        assert_eq!(field.field_type, FieldType::Float);
    }

    #[test]
    fn test_optional_field() {
        let field = resolve("age:int:optional");
        assert_eq!(field.field_type, FieldType::Integer);
        assert!(field.optional);
        assert_eq!(field.rust_type, "Option<i32>");
    }

    #[test]
    fn test_multiple_modifiers() {
        let spec = FieldSpec::parse("slug:string:unique:indexed").unwrap();
        assert!(spec.unique);
        assert!(spec.indexed);
        assert_eq!(spec.to_string(), "slug:string:unique:indexed");
    }

    #[test]
    fn test_reference_defaults_to_restrict() {
        let field = resolve("author:references:User");
        assert_eq!(field.column, "author_id");
        assert_eq!(field.rust_type, "i64");
        let fk = field.foreign_key.unwrap();
        assert_eq!(fk.table, "users");
        assert_eq!(fk.column, "id");
        assert_eq!(fk.on_delete, OnDelete::Restrict);
    }

    #[test]
    fn test_reference_with_policy() {
        let field = resolve("post:belongs_to:Post:cascade");
        assert_eq!(field.foreign_key.unwrap().on_delete, OnDelete::Cascade);

        let field = resolve("category:references:Category:set_null:optional");
        let fk = field.foreign_key.unwrap();
        assert_eq!(fk.table, "categories");
        assert_eq!(fk.on_delete, OnDelete::SetNull);
    }

    #[test]
    fn test_set_null_requires_optional() {
        let err = FieldSpec::parse("owner:references:User:set_null")
            .unwrap()
            .resolve(Dialect::Sqlite)
            .unwrap_err();
        assert_eq!(err, FieldError::SetNullRequiresOptional("owner".to_string()));
    }

    #[test]
    fn test_policy_without_reference() {
        let err = FieldSpec::parse("title:string:cascade")
            .unwrap()
            .resolve(Dialect::Sqlite)
            .unwrap_err();
        assert!(matches!(err, FieldError::PolicyWithoutReference(_)));
    }

    #[test]
    fn test_reference_without_model() {
        let err = FieldSpec::parse("author:references")
            .unwrap()
            .resolve(Dialect::Sqlite)
            .unwrap_err();
        assert!(matches!(err, FieldError::MissingReference(_)));
    }

    #[test]
    fn test_reference_model_must_be_identifier() {
        for input in ["author:references:ẞẞ", "author:references:9Users", "author:REFERENCES:Us-er"] {
            let err = FieldSpec::parse(input)
                .unwrap()
                .resolve(Dialect::Sqlite)
                .unwrap_err();
            assert!(matches!(err, FieldError::InvalidReference { .. }), "{input}: {err:?}");
        }
    }

    #[test]
    fn test_reference_keyword_is_case_insensitive() {
        let field = resolve("author:References:User");
        assert_eq!(field.foreign_key.unwrap().table, "users");
    }

    #[test]
    fn test_non_ascii_type_text_is_unknown() {
        let err = FieldSpec::parse("size:ẞtring")
            .unwrap()
            .resolve(Dialect::Sqlite)
            .unwrap_err();
        assert!(matches!(err, FieldError::UnknownType { .. }));
        assert!(FieldSpec::parse("straße").is_err());
    }

    #[test]
    fn test_postgres_storage_types() {
        let cases = [
            ("name:string", "VARCHAR(255)"),
            ("bio:text", "TEXT"),
            ("count:bigint", "BIGINT"),
            ("price:decimal", "DECIMAL(19,4)"),
            ("seen_at:timestamp", "TIMESTAMP WITH TIME ZONE"),
            ("token:uuid", "UUID"),
            ("data:json", "JSONB"),
        ];
        for (input, expected) in cases {
            let field = FieldSpec::parse(input).unwrap().resolve(Dialect::Postgres).unwrap();
            assert_eq!(field.sql_type, expected, "{input}");
        }
    }

    #[test]
    fn test_parse_invalid_input() {
        assert!(FieldSpec::parse(":string").is_err());
        assert!(FieldSpec::parse("123invalid:string").is_err());
        assert!(FieldSpec::parse("invalid-name:string").is_err());
        assert!(FieldSpec::parse("field:string:bogus").is_err());
        assert!(FieldSpec::parse("field:invalid_type")
            .unwrap()
            .resolve(Dialect::Sqlite)
            .is_err());
    }
}
