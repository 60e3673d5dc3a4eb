//! `acton-scaffold schema Tag label:string:unique`

use super::{parse_fields, run, GenerateArgs};
use acton_scaffold::generator::ResourceSpec;
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// Generate storage artifacts only
#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Model name
    pub name: String,

    /// Field definitions
    #[arg(required = true)]
    pub fields: Vec<String>,

    #[command(flatten)]
    pub common: GenerateArgs,
}

impl SchemaCommand {
    pub fn execute(&self, project_root: &Path) -> Result<()> {
        let spec = ResourceSpec::schema(&self.name, parse_fields(&self.fields)?);
        run(project_root, &spec, &self.common, |_| {})
    }
}
