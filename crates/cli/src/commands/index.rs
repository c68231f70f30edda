use anyhow::Result;
use std::path::Path;
use tracing::debug;

use super::directory_or_cwd;
use crate::cli::GlobalOptions;
use crate::display::print_json;
use crate::workspace::Workspace;

pub fn index_command(path: Option<&Path>, options: &GlobalOptions) -> Result<()> {
    let start = directory_or_cwd(path)?;
    debug!("Indexing from: {}", start.display());

    let mut workspace = Workspace::open(&start, options.root.as_deref())?;
    let stats = workspace.index()?;

    if options.json {
        return print_json(&stats);
    }

    println!("🔍 Indexed: {}", workspace.root().display());
    println!("   📄 Files: {}", stats.files);
    println!("   🧩 Components: {}", stats.components);
    if stats.removed > 0 {
        println!("   🗑️  Removed: {}", stats.removed);
    }
    if stats.failed > 0 {
        println!("   ⚠️  Failed: {} (run with RUST_LOG=warn for details)", stats.failed);
    }
    Ok(())
}
