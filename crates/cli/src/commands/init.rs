use anyhow::{Context, Result};
use cfml_lens_core::config::{CONFIG_FILE_NAME, ConfigFile};
use cfml_lens_core::services::StdFileSystem;
use cfml_lens_core::{Config, FileSystem};
use std::path::Path;
use tracing::info;

use super::directory_or_cwd;

/// The defaults spelled out, so the file documents every setting
fn default_config_file() -> ConfigFile {
    let defaults = Config::default();
    ConfigFile {
        component_extensions: Some(defaults.component_extensions),
        template_extensions: Some(defaults.template_extensions),
        exclude: Some(defaults.exclude),
        mappings: Some(defaults.mappings),
        docs_dir: None,
        doc_cache_capacity: Some(defaults.doc_cache_capacity),
    }
}

pub fn init_command(cwd: Option<&Path>, force: bool) -> Result<()> {
    // Determine the project root
    let project_root = directory_or_cwd(cwd)?
        .canonicalize()
        .context("Failed to canonicalize project root")?;

    println!("🚀 Initializing cfml-lens in: {}", project_root.display());

    let config_path = project_root.join(CONFIG_FILE_NAME);
    if config_path.exists() && !force {
        println!("❌ Config already exists at: {}", config_path.display());
        println!("   Use --force to overwrite");
        return Ok(());
    }

    let config = default_config_file();
    config
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    info!("Wrote {}", config_path.display());
    println!("✅ Created config: {}", config_path.display());

    let defaults = Config::default();
    let files = StdFileSystem::new()
        .list_files(&project_root, &defaults.source_extensions(), &defaults.exclude)
        .with_context(|| format!("Failed to scan {}", project_root.display()))?;
    let components = files.iter().filter(|file| defaults.is_component_file(file)).count();
    println!(
        "📦 Found {} components and {} templates",
        components,
        files.len() - components
    );

    println!("\n📌 Next steps:");
    println!("   Add \"mappings\" for directories outside the project root");
    println!("   Set \"docs_dir\" to enable `cfml-lens doc <name>`");
    println!("   Run `cfml-lens index` to check the setup");
    Ok(())
}
