use anyhow::{Context, Result, bail};
use cfml_lens_core::DocumentationLookup;
use cfml_lens_core::services::{CachedLookup, LocalDocumentation};
use tracing::debug;

use super::directory_or_cwd;
use crate::cli::GlobalOptions;
use crate::display::{print_descriptor, print_json};
use crate::workspace::Workspace;

/// How many close matches to suggest for an unknown name
const MAX_SUGGESTIONS: usize = 10;

pub fn doc_command(name: &str, options: &GlobalOptions) -> Result<()> {
    let start = directory_or_cwd(None)?;
    let workspace = Workspace::open(&start, options.root.as_deref())?;
    let Some(docs_dir) = workspace.config().docs_dir.clone() else {
        bail!("No docs_dir configured in .cfml-lens.json");
    };
    debug!("Looking up '{}' in {}", name, docs_dir.display());

    let lookup = CachedLookup::new(LocalDocumentation::new(docs_dir), workspace.config().doc_cache_capacity);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async {
        let descriptor = lookup
            .lookup(name)
            .await
            .with_context(|| format!("Failed to look up '{}'", name))?;

        if options.json {
            return print_json(&descriptor);
        }
        if let Some(descriptor) = descriptor {
            print_descriptor(&descriptor);
            return Ok(());
        }

        let prefix = name.to_lowercase();
        let suggestions: Vec<String> = lookup
            .all_names()
            .await
            .context("Failed to list documented names")?
            .into_iter()
            .filter(|candidate| candidate.starts_with(&prefix))
            .take(MAX_SUGGESTIONS)
            .collect();

        println!("❌ No documentation for '{}'", name);
        if !suggestions.is_empty() {
            println!("   Did you mean: {}", suggestions.join(", "));
        }
        Ok(())
    })
}
