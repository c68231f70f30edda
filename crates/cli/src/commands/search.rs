use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use super::directory_or_cwd;
use crate::cli::GlobalOptions;
use crate::display::print_json;
use crate::workspace::Workspace;

/// One search hit
#[derive(Debug, Serialize)]
struct SearchResult {
    name: String,
    uri: PathBuf,
    line: u32,
}

pub fn search_command(prefix: &str, functions: bool, options: &GlobalOptions) -> Result<()> {
    let start = directory_or_cwd(None)?;
    let workspace = Workspace::indexed(&start, options.root.as_deref())?;
    let cache = workspace.cache();

    let results: Vec<SearchResult> = if functions {
        cache
            .search_functions_by_prefix(prefix)
            .into_iter()
            .map(|function| SearchResult {
                name: function.name.clone(),
                uri: function.location.uri.clone(),
                line: function.name_range.start.line + 1,
            })
            .collect()
    } else {
        cache
            .search_components_by_prefix(prefix)
            .into_iter()
            .map(|component| SearchResult {
                name: component.name.clone(),
                uri: component.uri.clone(),
                line: component.declaration_range.start.line + 1,
            })
            .collect()
    };

    if options.json {
        return print_json(&results);
    }

    let what = if functions { "functions" } else { "components" };
    if results.is_empty() {
        println!("❌ No {} starting with '{}'", what, prefix);
        return Ok(());
    }
    println!("🔍 {} {} starting with '{}':", results.len(), what, prefix);
    for result in &results {
        println!("   {} {}:{}", result.name, result.uri.display(), result.line);
    }
    Ok(())
}
