//! Kit cascade inspection

use acton_scaffold::kit::{KitResolver, KitTier};
use acton_scaffold::ScaffoldConfig;
use anyhow::{Context, Result};
use clap::Subcommand;
use console::style;
use std::path::Path;

const TEMPLATES: &[&str] = &[
    "resource/handler.rs",
    "resource/template.html",
    "resource/tests.rs",
    "resource/schema.sql",
    "resource/queries.sql",
    "resource/migration_up.sql",
    "resource/migration_down.sql",
    "view/handler.rs",
    "view/template.html",
    "view/tests.rs",
];

#[derive(Subcommand, Debug)]
pub enum KitsCommand {
    /// List every kit visible from this project
    List,
    /// Show a kit's manifest and where each template resolves from
    Show {
        /// Kit name
        kit: String,
    },
    /// Diff an overridden template against the one it shadows
    Diff {
        /// Kit name
        kit: String,
        /// Template path inside the kit (e.g. `resource/handler.rs`)
        template: String,
    },
}

impl KitsCommand {
    pub fn execute(&self, project_root: &Path) -> Result<()> {
        let config = ScaffoldConfig::load(project_root).context("Failed to load configuration")?;
        let resolver = KitResolver::new(
            project_root.join(&config.paths.project_kits_dir),
            config.paths.user_kits_dir.clone(),
        );

        match self {
            Self::List => list(&resolver),
            Self::Show { kit } => show(&resolver, kit),
            Self::Diff { kit, template } => diff(&resolver, kit, template),
        }
    }
}

fn list(resolver: &KitResolver) -> Result<()> {
    let listing = resolver.list_kits().context("Failed to enumerate kits")?;
    for entry in listing {
        let shadows = if entry.shadowed.is_empty() {
            String::new()
        } else {
            let tiers: Vec<String> = entry.shadowed.iter().map(ToString::to_string).collect();
            format!(" (shadows {})", tiers.join(", "))
        };
        match entry.kit {
            Ok(kit) => println!(
                "  {} {} {}{}  {}",
                style(&entry.name).green().bold(),
                style(kit.version()).dim(),
                style(format!("[{}]", entry.tier)).cyan(),
                style(shadows).dim(),
                kit.manifest().description
            ),
            Err(reason) => println!(
                "  {} {}  {}",
                style(&entry.name).red().bold(),
                style(format!("[{}]", entry.tier)).cyan(),
                style(reason).red()
            ),
        }
    }
    Ok(())
}

fn show(resolver: &KitResolver, name: &str) -> Result<()> {
    let kit = resolver
        .load(name)
        .with_context(|| format!("Failed to load kit '{name}'"))?;
    let manifest = kit.manifest();

    println!(
        "{} {} ({})",
        style(kit.name()).green().bold(),
        kit.version(),
        kit.location()
    );
    if !manifest.description.is_empty() {
        println!("  {}", manifest.description);
    }
    let styling = manifest
        .styling
        .clone()
        .unwrap_or_else(|| format!("any of {}", resolver.strategies().names().join(", ")));
    println!("  styling: {styling}");
    if !manifest.components.is_empty() {
        println!("  components: {}", manifest.components.join(", "));
    }

    println!("\n  {}", style("templates").cyan().bold());
    for template in TEMPLATES {
        match resolver.template_origin(name, template) {
            Ok(tier) => {
                let tier_label = format!("{:>8}", tier.to_string());
                let tier_label = if tier == KitTier::BuiltIn {
                    style(tier_label).dim()
                } else {
                    style(tier_label).yellow()
                };
                println!("  {tier_label}  {template}");
            }
            Err(_) => println!("  {}  {template}", style(format!("{:>8}", "missing")).red()),
        }
    }
    Ok(())
}

fn diff(resolver: &KitResolver, kit: &str, template: &str) -> Result<()> {
    match resolver
        .diff_template(kit, template)
        .with_context(|| format!("Failed to resolve '{template}' in kit '{kit}'"))?
    {
        Some(diff) => print!("{diff}"),
        None => println!("{template} is not overridden"),
    }
    Ok(())
}
