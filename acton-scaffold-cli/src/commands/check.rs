//! `acton-scaffold check src/post/post.html`

use acton_scaffold::validator::TemplateValidator;
use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::path::PathBuf;

/// Check that runtime templates parse
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Template files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Lines of context around an error
    #[arg(long, default_value_t = acton_scaffold::validator::DEFAULT_CONTEXT_LINES)]
    pub context: usize,
}

impl CheckCommand {
    pub fn execute(&self) -> Result<()> {
        let validator = TemplateValidator::new(self.context);
        let mut failures = 0;
        for file in &self.files {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            match validator.validate(&file.display().to_string(), &content) {
                Ok(()) => println!("  {}  {}", style("ok").green(), file.display()),
                Err(diagnostic) => {
                    failures += 1;
                    eprintln!("{} {diagnostic}", style("error:").red().bold());
                }
            }
        }
        if failures > 0 {
            anyhow::bail!("{failures} template(s) failed to parse");
        }
        Ok(())
    }
}
