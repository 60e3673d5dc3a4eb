//! CLI command implementations

pub mod check;
pub mod kits;
pub mod resource;
pub mod schema;
pub mod view;

pub use check::CheckCommand;
pub use kits::KitsCommand;
pub use resource::ResourceCommand;
pub use schema::SchemaCommand;
pub use view::ViewCommand;

use acton_scaffold::field::{Dialect, FieldSpec};
use acton_scaffold::generator::{
    EditSurface, GenerateError, GenerationOptions, GenerationReport, Generator, PaginationMode,
    ResourceSpec, WriteOutcome,
};
use acton_scaffold::ScaffoldConfig;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use console::style;
use std::path::Path;

/// Flags shared by every generator
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Kit to generate from (defaults to `[defaults] kit`)
    #[arg(long, short)]
    pub kit: Option<String>,

    /// Styling strategy for style-agnostic kits
    #[arg(long, short)]
    pub styling: Option<String>,

    /// Storage dialect
    #[arg(long, value_enum)]
    pub dialect: Option<DialectArg>,

    /// Route path (defaults to the derived one)
    #[arg(long)]
    pub route: Option<String>,

    /// Overwrite per-resource files that differ
    #[arg(long)]
    pub force: bool,
}

/// Storage dialect
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectArg {
    /// `SQLite` (`?N` placeholders)
    Sqlite,
    /// `PostgreSQL` (`$N` placeholders)
    Postgres,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Sqlite => Self::Sqlite,
            DialectArg::Postgres => Self::Postgres,
        }
    }
}

/// List page pagination
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationArg {
    /// Render every row
    None,
    /// Page numbers
    Offset,
    /// Load-more cursor
    Cursor,
}

impl From<PaginationArg> for PaginationMode {
    fn from(arg: PaginationArg) -> Self {
        match arg {
            PaginationArg::None => Self::None,
            PaginationArg::Offset => Self::Offset,
            PaginationArg::Cursor => Self::Cursor,
        }
    }
}

/// Where create and edit forms render
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditArg {
    /// Dialog over the list
    Modal,
    /// Separate page
    Page,
}

impl From<EditArg> for EditSurface {
    fn from(arg: EditArg) -> Self {
        match arg {
            EditArg::Modal => Self::Modal,
            EditArg::Page => Self::Page,
        }
    }
}

impl GenerateArgs {
    /// Options from configuration with command-line overrides applied
    fn options(&self, config: &ScaffoldConfig) -> GenerationOptions {
        let mut options = config.generation_options();
        if let Some(styling) = &self.styling {
            options.strategy = Some(styling.clone());
        }
        if let Some(dialect) = self.dialect {
            options.dialect = dialect.into();
        }
        options.route.clone_from(&self.route);
        options.force = self.force;
        options
    }
}

/// Parse `name[:type][:modifiers]` arguments
fn parse_fields(fields: &[String]) -> Result<Vec<FieldSpec>> {
    fields
        .iter()
        .map(|field| {
            FieldSpec::parse(field).with_context(|| format!("Invalid field definition '{field}'"))
        })
        .collect()
}

/// Load configuration, run the generator and print the report
fn run(
    project_root: &Path,
    spec: &ResourceSpec,
    args: &GenerateArgs,
    tweak: impl FnOnce(&mut GenerationOptions),
) -> Result<()> {
    let config = ScaffoldConfig::load(project_root).context("Failed to load configuration")?;
    let mut options = args.options(&config);
    tweak(&mut options);
    let kit = args.kit.as_deref().unwrap_or(&config.defaults.kit);

    println!(
        "\n{} {} {} {}",
        style("Generating").cyan().bold(),
        style(spec.kind).cyan(),
        style(&spec.name).green().bold(),
        style(format!("(kit: {kit})")).dim()
    );

    let generator = Generator::from_config(project_root, &config);
    match generator.generate(spec, kit, &options) {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(GenerateError::TemplateSyntax(diagnostic)) => {
            eprintln!(
                "\n{} the generated template does not parse; it was left on disk for editing:\n",
                style("error:").red().bold()
            );
            eprintln!("{diagnostic}");
            anyhow::bail!("Generated template failed validation")
        }
        Err(err) => Err(err).with_context(|| format!("Failed to generate '{}'", spec.name)),
    }
}

fn print_report(report: &GenerationReport) {
    println!(
        "{}",
        style(format!("  kit {} · styling {}", report.kit, report.strategy)).dim()
    );
    for file in report.files.iter().chain(report.migration.as_ref()) {
        let label = format!("{:>9}", file.outcome.to_string());
        let label = match file.outcome {
            WriteOutcome::Created | WriteOutcome::Appended => style(label).green(),
            WriteOutcome::Updated => style(label).yellow(),
            WriteOutcome::Unchanged => style(label).dim(),
            WriteOutcome::Skipped => style(label).yellow().bold(),
        };
        println!("  {label}  {}", file.path.display());
    }

    if let Some(mutation) = report.mutation {
        if mutation.changed() {
            println!("  {}  composition root", style("    wired").green());
        }
    }
    if report.registered {
        println!("  {}  registry", style(" recorded").green());
    }

    if report
        .files
        .iter()
        .any(|file| file.outcome == WriteOutcome::Skipped)
    {
        println!(
            "\n{} Files marked skipped differ from the kit output; rerun with {} to overwrite.",
            style("note:").yellow().bold(),
            style("--force").yellow()
        );
    }

    for warning in &report.warnings {
        println!("\n{} {warning}", style("warning:").yellow().bold());
    }

    println!(
        "\n{} {} is ready.",
        style("Done:").green().bold(),
        style(&report.package).green().bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let config = ScaffoldConfig::default();
        let args = GenerateArgs {
            styling: Some("bootstrap".to_string()),
            dialect: Some(DialectArg::Postgres),
            force: true,
            ..GenerateArgs::default()
        };
        let options = args.options(&config);
        assert_eq!(options.strategy.as_deref(), Some("bootstrap"));
        assert_eq!(options.dialect, Dialect::Postgres);
        assert!(options.force);
        assert_eq!(options.page_size, config.defaults.page_size);
    }

    #[test]
    fn test_parse_fields_reports_offender() {
        let err = parse_fields(&["title".to_string(), "9lives".to_string()]).unwrap_err();
        assert!(err.to_string().contains("9lives"));
    }
}
