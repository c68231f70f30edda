use anyhow::{Context, Result};
use cfml_lens_core::config::ROOT_ENV_VAR;
use cfml_lens_core::services::{FileSystemLocator, StdFileSystem};
use cfml_lens_core::{
    Component, Config, ConfigLoader, Document, DocumentContext, EntityCache, FileUpdate, IndexStats, Indexer,
    Variable, analyze_variables, parse_component,
};
use std::path::{Path, PathBuf};

/// A project on disk: its configuration, an indexer over its files and
/// the cache that indexer fills
pub struct Workspace {
    indexer: Indexer<StdFileSystem>,
    cache: EntityCache,
}

fn absolute(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("File not found: {}", path.display()))
}

/// Directory of the nearest `.cfml-lens.json`, else the directory itself
/// (or the file's parent)
pub fn discover_root(start: &Path) -> PathBuf {
    let boundary = std::env::var(ROOT_ENV_VAR)
        .ok()
        .or_else(|| std::env::var("HOME").ok())
        .map(PathBuf::from);

    ConfigLoader::project_root(start, boundary.as_deref()).unwrap_or_else(|| {
        if start.is_file() {
            start.parent().unwrap_or(start).to_path_buf()
        } else {
            start.to_path_buf()
        }
    })
}

impl Workspace {
    /// Open the project containing `start`, or the explicit `root`
    pub fn open(start: &Path, root: Option<&Path>) -> Result<Self> {
        let start = absolute(start)?;
        let root = match root {
            Some(root) => absolute(root)?,
            None => discover_root(&start),
        };
        tracing::debug!("Project root: {}", root.display());

        let config = ConfigLoader::load_from_path(&root)
            .with_context(|| format!("Failed to load configuration for {}", root.display()))?;
        let indexer = Indexer::new(StdFileSystem::new(), root, config);
        let cache = indexer.new_cache();
        Ok(Self { indexer, cache })
    }

    /// Open the project containing `start` and index it
    pub fn indexed(start: &Path, root: Option<&Path>) -> Result<Self> {
        let mut workspace = Self::open(start, root)?;
        workspace.index()?;
        Ok(workspace)
    }

    pub fn root(&self) -> &Path {
        self.indexer.root()
    }

    pub fn config(&self) -> &Config {
        self.indexer.config()
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub fn index(&mut self) -> Result<IndexStats> {
        self.indexer
            .reindex(&mut self.cache)
            .with_context(|| format!("Failed to index {}", self.root().display()))
    }

    pub fn update_file(&mut self, path: &Path) -> Result<FileUpdate> {
        self.indexer
            .update_file(&mut self.cache, path)
            .with_context(|| format!("Failed to update {}", path.display()))
    }

    pub fn remove_file(&mut self, path: &Path) -> FileUpdate {
        self.indexer.remove_file(&mut self.cache, path)
    }

    pub fn read_document(&self, path: &Path) -> Result<Document> {
        let path = absolute(path)?;
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Document::new(path, text))
    }

    /// The component declared by `document`: the cached one when the file
    /// was indexed, otherwise a fresh parse resolving paths on disk
    pub fn component(&self, document: &Document) -> Option<Component> {
        if !self.config().is_component_file(document.uri()) {
            return None;
        }
        if let Some(component) = self.cache.get_component(document.uri()) {
            return Some(component.clone());
        }
        parse_component(document, &self.locator())
    }

    /// Resolves dotted paths against the files on disk
    pub fn locator(&self) -> FileSystemLocator<StdFileSystem> {
        FileSystemLocator::new(StdFileSystem::new(), self.indexer.layout())
    }

    /// Variables declared anywhere in a template
    pub fn template_variables(&self, document: &Document) -> Vec<Variable> {
        let ctx = DocumentContext::new(document, false);
        analyze_variables(&ctx, None, &self.locator())
    }
}
