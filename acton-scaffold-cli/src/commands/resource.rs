//! `acton-scaffold resource Post title body:text published:bool`

use super::{parse_fields, run, EditArg, GenerateArgs, PaginationArg};
use acton_scaffold::generator::ResourceSpec;
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// Generate a store-backed resource
#[derive(Args, Debug)]
pub struct ResourceCommand {
    /// Resource name (e.g. `Post`, `BlogPost`)
    pub name: String,

    /// Field definitions (`title`, `body:text`, `author:references:User:cascade`)
    #[arg(required = true)]
    pub fields: Vec<String>,

    /// List pagination
    #[arg(long, value_enum)]
    pub pagination: Option<PaginationArg>,

    /// Rows per page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Where create and edit forms render
    #[arg(long, value_enum)]
    pub edit: Option<EditArg>,

    #[command(flatten)]
    pub common: GenerateArgs,
}

impl ResourceCommand {
    pub fn execute(&self, project_root: &Path) -> Result<()> {
        let spec = ResourceSpec::resource(&self.name, parse_fields(&self.fields)?);
        run(project_root, &spec, &self.common, |options| {
            if let Some(pagination) = self.pagination {
                options.pagination = pagination.into();
            }
            if let Some(page_size) = self.page_size {
                options.page_size = page_size;
            }
            if let Some(edit) = self.edit {
                options.edit_surface = edit.into();
            }
        })
    }
}
