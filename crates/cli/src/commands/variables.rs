use anyhow::{Result, anyhow};
use cfml_lens_core::symbols::visible_variables;
use cfml_lens_core::{Document, Position};
use std::path::Path;
use tracing::debug;

use crate::cli::GlobalOptions;
use crate::display::{print_json, print_variables};
use crate::utils::parser::parse_filepath_with_line;
use crate::workspace::Workspace;

/// Byte offset of the start of a 0-based line
pub(crate) fn line_offset(document: &Document, line: usize, character: usize) -> Result<usize> {
    let position = Position::new(line as u32, character as u32);
    document.offset_at(position).ok_or_else(|| {
        anyhow!(
            "Position {}:{} is past the end of {}",
            line + 1,
            character + 1,
            document.uri().display()
        )
    })
}

pub fn variables_command(filepath_arg: &str, options: &GlobalOptions) -> Result<()> {
    let (filepath, line) = parse_filepath_with_line(filepath_arg);
    debug!("Listing variables in {} at {:?}", filepath, line);
    let filepath = Path::new(&filepath);

    let workspace = Workspace::indexed(filepath, options.root.as_deref())?;
    let document = workspace.read_document(filepath)?;
    let component = workspace.component(&document);

    let variables = match (line, &component) {
        (Some(line), component) => {
            let offset = line_offset(&document, line, 0)?;
            visible_variables(workspace.cache(), &document, component.as_ref(), offset)
        }
        (None, Some(component)) => component.variables.clone(),
        (None, None) => workspace.template_variables(&document),
    };

    if options.json {
        print_json(&variables)
    } else {
        print_variables(document.uri(), line, &variables);
        Ok(())
    }
}
