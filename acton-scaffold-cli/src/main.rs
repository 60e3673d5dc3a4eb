//! acton-scaffold CLI

#![allow(clippy::multiple_crate_versions)]

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{CheckCommand, KitsCommand, ResourceCommand, SchemaCommand, ViewCommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "acton-scaffold")]
#[command(version)]
#[command(about = "Generate resources for acton-htmx applications from template kits", long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, short = 'C', global = true)]
    project: Option<PathBuf>,

    /// More log output
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a store-backed resource (handler, template, tests, storage)
    Resource(ResourceCommand),
    /// Generate a page without storage
    View(ViewCommand),
    /// Generate storage artifacts only (schema, queries, migration)
    Schema(SchemaCommand),
    /// Inspect the kit cascade
    Kits {
        #[command(subcommand)]
        command: KitsCommand,
    },
    /// Check that a runtime template parses
    Check(CheckCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    acton_scaffold::observability::init(cli.verbose).context("Failed to initialize logging")?;

    let project_root = match cli.project {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Commands::Resource(cmd) => cmd.execute(&project_root),
        Commands::View(cmd) => cmd.execute(&project_root),
        Commands::Schema(cmd) => cmd.execute(&project_root),
        Commands::Kits { command } => command.execute(&project_root),
        Commands::Check(cmd) => cmd.execute(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resource() {
        let cli = Cli::try_parse_from([
            "acton-scaffold",
            "resource",
            "Post",
            "title",
            "author:references:User",
            "--pagination",
            "cursor",
        ])
        .unwrap();
        let Commands::Resource(cmd) = cli.command else {
            panic!("expected resource command");
        };
        assert_eq!(cmd.name, "Post");
        assert_eq!(cmd.fields.len(), 2);
    }

    #[test]
    fn test_store_backed_commands_require_fields() {
        assert!(Cli::try_parse_from(["acton-scaffold", "schema", "Tag"]).is_err());
        assert!(Cli::try_parse_from(["acton-scaffold", "resource", "Post"]).is_err());
    }

    #[test]
    fn test_page_size_must_be_positive() {
        let parse = |size: &str| {
            Cli::try_parse_from(["acton-scaffold", "resource", "Post", "title", "--page-size", size])
        };
        assert!(parse("0").is_err());
        let Commands::Resource(cmd) = parse("10").unwrap().command else {
            panic!("expected resource command");
        };
        assert_eq!(cmd.page_size, Some(10));
    }
}
