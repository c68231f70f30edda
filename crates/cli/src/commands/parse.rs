use anyhow::{Result, bail};
use std::path::Path;
use tracing::debug;

use crate::cli::GlobalOptions;
use crate::display::{print_component, print_json};
use crate::utils::file::determine_file_type;
use crate::workspace::Workspace;

pub fn parse_command(filepath: &Path, options: &GlobalOptions) -> Result<()> {
    debug!("Parsing file: {}", filepath.display());

    let workspace = Workspace::open(filepath, options.root.as_deref())?;
    let document = workspace.read_document(filepath)?;
    let Some(component) = workspace.component(&document) else {
        bail!("No component declared in {}", filepath.display());
    };

    if options.json {
        print_json(&component)
    } else {
        println!("{}", determine_file_type(document.uri(), workspace.config()));
        print_component(&component);
        Ok(())
    }
}
