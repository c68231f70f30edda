use anyhow::{Result, bail};
use cfml_lens_core::symbols::definition_at;
use std::path::Path;
use tracing::debug;

use super::variables::line_offset;
use crate::cli::GlobalOptions;
use crate::display::{print_definition, print_json};
use crate::utils::parser::parse_filepath_with_position;
use crate::workspace::Workspace;

pub fn definition_command(location: &str, options: &GlobalOptions) -> Result<()> {
    let (filepath, position) = parse_filepath_with_position(location);
    let Some((line, character)) = position else {
        bail!("Expected <file>:<line>:<column>, got '{}'", location);
    };
    debug!("Looking up definition at {}:{}:{}", filepath, line, character);
    let filepath = Path::new(&filepath);

    let workspace = Workspace::indexed(filepath, options.root.as_deref())?;
    let document = workspace.read_document(filepath)?;
    let component = workspace.component(&document);
    let offset = line_offset(&document, line, character)?;

    let definition = definition_at(workspace.cache(), &document, component.as_ref(), offset);

    if options.json {
        return print_json(&definition);
    }
    match definition {
        Some(definition) => print_definition(&definition),
        None => println!("❌ No definition found at {}", location),
    }
    Ok(())
}
