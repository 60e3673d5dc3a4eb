//! `acton-scaffold view about`

use super::{run, GenerateArgs};
use acton_scaffold::generator::ResourceSpec;
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// Generate a page without storage
#[derive(Args, Debug)]
pub struct ViewCommand {
    /// View name (e.g. `about`, `dashboard`)
    pub name: String,

    #[command(flatten)]
    pub common: GenerateArgs,
}

impl ViewCommand {
    pub fn execute(&self, project_root: &Path) -> Result<()> {
        run(project_root, &ResourceSpec::view(&self.name), &self.common, |_| {})
    }
}
