//! acton-scaffold: kit-based resource generation for acton-htmx applications
//!
//! Generates a complete resource (handler module, UI template, tests,
//! schema and query fragments, migration) from a name and a field list,
//! wires it into the application's composition root and checks the
//! generated UI template parses.
//!
//! Templates come from *kits*. A kit is looked up in three tiers, highest
//! precedence first:
//!
//! 1. Project: `<project>/.acton/kits/<kit>/`
//! 2. User: `~/.config/acton-scaffold/kits/<kit>/`
//! 3. Built-in kits embedded in the binary
//!
//! Each template file is resolved independently, so a project kit may
//! override a single file and inherit the rest.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use acton_scaffold::field::FieldSpec;
//! use acton_scaffold::generator::{GenerationOptions, Generator, ResourceSpec};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = Generator::new(".");
//! let spec = ResourceSpec::resource(
//!     "Post",
//!     vec![FieldSpec::parse("title")?, FieldSpec::parse("published:bool")?],
//! );
//! let report = generator.generate(&spec, "default", &GenerationOptions::default())?;
//! for file in &report.files {
//!     println!("{} {}", file.outcome, file.path.display());
//! }
//! # Ok(())
//! # }
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod field;
pub mod generator;
pub mod kit;
pub mod mutator;
pub mod naming;
pub mod observability;
pub mod styling;
pub mod validator;

pub use config::{ConfigError, ScaffoldConfig};
pub use generator::{GenerateError, GenerationReport, Generator};
pub use naming::Naming;

/// Common imports
pub mod prelude {
    pub use crate::config::ScaffoldConfig;
    pub use crate::field::{Dialect, FieldSpec, FieldType, OnDelete};
    pub use crate::generator::{
        EditSurface, GenerateError, GenerationKind, GenerationOptions, GenerationReport,
        Generator, PaginationMode, ResourceSpec, WriteOutcome,
    };
    pub use crate::kit::{KitResolver, KitTier};
    pub use crate::naming::Naming;
    pub use crate::styling::{StrategyRegistry, StylingStrategy};
}
