use anyhow::Result;
use cfml_lens_core::symbols::{document_symbols, variable_symbols};
use std::path::Path;
use tracing::debug;

use crate::cli::GlobalOptions;
use crate::display::{print_json, print_symbol_tree};
use crate::workspace::Workspace;

pub fn symbols_command(filepath: &Path, options: &GlobalOptions) -> Result<()> {
    debug!("Outlining file: {}", filepath.display());

    let workspace = Workspace::open(filepath, options.root.as_deref())?;
    let document = workspace.read_document(filepath)?;

    let symbols = match workspace.component(&document) {
        Some(component) => vec![document_symbols(&component)],
        None => variable_symbols(&workspace.template_variables(&document)),
    };

    if options.json {
        print_json(&symbols)
    } else {
        print_symbol_tree(document.uri(), &symbols);
        Ok(())
    }
}
