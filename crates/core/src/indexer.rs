//! Populating an [`EntityCache`] from the files of a project.
//!
//! The cache itself never performs I/O. The indexer enumerates and reads
//! files through a [`FileSystem`], parses them and applies the results as
//! ordinary cache mutations, so readers may observe a reindex in progress.

use crate::cache::EntityCache;
use crate::config::Config;
use crate::document::{Document, DocumentContext};
use crate::error::Result;
use crate::interfaces::{ComponentLocator, FileSystem};
use crate::parser::{analyze_variables, parse_component};
use crate::resolve::ProjectLayout;
use crate::services::FileSystemLocator;
use crate::types::{Scope, Variable};
use serde::Serialize;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Outcome of applying one file to the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileUpdate {
    /// Content hash matched the last indexed version
    Unchanged,
    Updated,
    Removed,
    /// Not a file the cache tracks
    Ignored,
}

/// Counters reported by [`Indexer::reindex`]; `unchanged` counts files
/// whose content matched the previous pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub files: usize,
    pub components: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Which special variable store a file feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VariableStore {
    Application,
    Server,
}

impl VariableStore {
    fn for_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        if stem.eq_ignore_ascii_case("application") {
            Some(Self::Application)
        } else if stem.eq_ignore_ascii_case("server") {
            Some(Self::Server)
        } else {
            None
        }
    }

    fn scope(self) -> Scope {
        match self {
            Self::Application => Scope::Application,
            Self::Server => Scope::Server,
        }
    }
}

fn compute_hash(text: &str) -> String {
    format!("{:x}", md5::compute(text.as_bytes()))
}

pub struct Indexer<F> {
    file_system: F,
    root: PathBuf,
    config: Config,
    hashes: HashMap<PathBuf, String>,
    /// Files whose last parse left a component reference unresolved
    unresolved: HashSet<PathBuf>,
}

impl<F: FileSystem> Indexer<F> {
    pub fn new(file_system: F, root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            file_system,
            root: root.into(),
            config,
            hashes: HashMap::new(),
            unresolved: HashSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn file_system(&self) -> &F {
        &self.file_system
    }

    pub fn file_system_mut(&mut self) -> &mut F {
        &mut self.file_system
    }

    pub fn layout(&self) -> ProjectLayout {
        self.config.layout(&self.root)
    }

    /// An empty cache resolving dotted paths the way this project does
    pub fn new_cache(&self) -> EntityCache {
        EntityCache::new(self.layout())
    }

    /// Bring the cache in line with every source file under the root.
    ///
    /// Every file is parsed again so references resolve against the files
    /// present now. Files that disappeared are removed; files that cannot be
    /// read keep whatever the cache held for them. Running it again is safe.
    pub fn reindex(&mut self, cache: &mut EntityCache) -> Result<IndexStats> {
        let files = self.file_system.list_files(
            &self.root,
            &self.config.source_extensions(),
            &self.config.exclude,
        )?;
        cache.set_layout(self.layout());
        tracing::debug!("Reindexing {} files under {}", files.len(), self.root.display());

        let mut stats = IndexStats {
            files: files.len(),
            ..IndexStats::default()
        };

        let present: BTreeSet<&PathBuf> = files.iter().collect();
        let stale: Vec<PathBuf> = cache
            .components()
            .map(|component| component.uri.clone())
            .chain(cache.all_application_variables().map(|(uri, _)| uri.clone()))
            .chain(cache.all_server_variables().map(|(uri, _)| uri.clone()))
            .filter(|uri| uri.starts_with(&self.root) && !present.contains(uri))
            .collect();
        for uri in stale {
            if self.forget(cache, &uri) == FileUpdate::Removed {
                stats.removed += 1;
            }
        }

        for path in &files {
            match self.read(path) {
                Ok((text, hash)) => {
                    if self.hashes.get(path) == Some(&hash) {
                        stats.unchanged += 1;
                    }
                    self.apply(cache, path, text, hash);
                }
                Err(error) => {
                    tracing::warn!("Failed to index {}: {}", path.display(), error);
                    stats.failed += 1;
                }
            }
        }

        stats.components = cache.len();
        tracing::debug!("Reindex finished: {:?}", stats);
        Ok(stats)
    }

    /// Re-read and re-parse one file, skipping the parse when its content
    /// hash is unchanged and the cache still holds what it produced.
    ///
    /// A file seen for the first time also re-parses the files whose
    /// references did not resolve, since it may be the one they name.
    pub fn update_file(&mut self, cache: &mut EntityCache, path: &Path) -> Result<FileUpdate> {
        if !self.config.is_source_file(path) || self.config.is_excluded(&self.root, path) {
            return Ok(FileUpdate::Ignored);
        }
        let (text, hash) = self.read(path)?;
        let is_new = match self.hashes.get(path) {
            Some(previous) if *previous == hash && self.is_cached(cache, path) => {
                tracing::trace!("Unchanged: {}", path.display());
                return Ok(FileUpdate::Unchanged);
            }
            Some(_) => false,
            None => true,
        };

        let update = self.apply(cache, path, text, hash);
        if is_new && self.config.is_component_file(path) {
            let waiting: Vec<PathBuf> = self.unresolved.iter().filter(|uri| *uri != path).cloned().collect();
            self.refresh(cache, &waiting);
        }
        Ok(update)
    }

    /// Drop everything the cache knows about `path` and re-parse the
    /// components that extended or implemented it
    pub fn remove_file(&mut self, cache: &mut EntityCache, path: &Path) -> FileUpdate {
        let update = self.forget(cache, path);
        let dependents: Vec<PathBuf> = cache
            .components()
            .filter(|component| {
                component.extends_uri().is_some_and(|uri| uri == path)
                    || component
                        .implements
                        .iter()
                        .flatten()
                        .any(|reference| reference.uri == path)
            })
            .map(|component| component.uri.clone())
            .collect();
        self.refresh(cache, &dependents);
        update
    }

    fn forget(&mut self, cache: &mut EntityCache, path: &Path) -> FileUpdate {
        self.hashes.remove(path);
        self.unresolved.remove(path);
        let removed_component = cache.clear_component(path).is_some();
        let removed_application = cache.clear_application_variables(path).is_some();
        let removed_server = cache.clear_server_variables(path).is_some();

        if removed_component || removed_application || removed_server {
            tracing::debug!("Removed {}", path.display());
            FileUpdate::Removed
        } else {
            FileUpdate::Ignored
        }
    }

    /// Re-parse `paths` regardless of their content hash
    fn refresh(&mut self, cache: &mut EntityCache, paths: &[PathBuf]) {
        for path in paths {
            tracing::debug!("Re-resolving {}", path.display());
            match self.read(path) {
                Ok((text, hash)) => {
                    self.apply(cache, path, text, hash);
                }
                Err(error) => tracing::warn!("Failed to re-resolve {}: {}", path.display(), error),
            }
        }
    }

    fn read(&self, path: &Path) -> Result<(String, String)> {
        let text = self.file_system.read_to_string(path)?;
        let hash = compute_hash(&text);
        Ok((text, hash))
    }

    /// Whether the cache holds the entries a tracked file produces
    fn is_cached(&self, cache: &EntityCache, path: &Path) -> bool {
        let tracked = self.config.is_component_file(path) || VariableStore::for_path(path).is_some();
        !tracked
            || cache.contains(path)
            || cache.application_variables(path).is_some()
            || cache.server_variables(path).is_some()
    }

    fn apply(&mut self, cache: &mut EntityCache, path: &Path, text: String, hash: String) -> FileUpdate {
        let document = Document::new(path, text);
        let locator = RecordingLocator::new(FileSystemLocator::new(&self.file_system, self.layout()));
        let store = VariableStore::for_path(path);
        let mut update = FileUpdate::Ignored;
        let mut is_script = false;

        if self.config.is_component_file(path) {
            match parse_component(&document, &locator) {
                Some(component) => {
                    is_script = component.is_script;
                    cache.cache_component(component);
                    update = FileUpdate::Updated;
                }
                None => {
                    tracing::debug!("{} declares no component", path.display());
                    if cache.clear_component(path).is_some() {
                        update = FileUpdate::Removed;
                    }
                }
            }
        }

        if let Some(store) = store {
            let ctx = DocumentContext::new(&document, is_script);
            let variables: Vec<Variable> = analyze_variables(&ctx, None, &locator)
                .into_iter()
                .filter(|variable| variable.scope == store.scope())
                .collect();
            tracing::debug!("{} {:?} variables in {}", variables.len(), store, path.display());
            match store {
                VariableStore::Application => cache.set_application_variables(path.to_path_buf(), variables),
                VariableStore::Server => cache.set_server_variables(path.to_path_buf(), variables),
            }
            update = FileUpdate::Updated;
        }

        if locator.missed() {
            self.unresolved.insert(path.to_path_buf());
        } else {
            self.unresolved.remove(path);
        }
        self.hashes.insert(path.to_path_buf(), hash);
        update
    }
}

/// Passes lookups through and remembers whether any of them failed
struct RecordingLocator<L> {
    inner: L,
    missed: Cell<bool>,
}

impl<L: ComponentLocator> RecordingLocator<L> {
    fn new(inner: L) -> Self {
        Self {
            inner,
            missed: Cell::new(false),
        }
    }

    fn missed(&self) -> bool {
        self.missed.get()
    }
}

impl<L: ComponentLocator> ComponentLocator for RecordingLocator<L> {
    fn locate(&self, dotted_path: &str, base_uri: &Path) -> Option<PathBuf> {
        let found = self.inner.locate(dotted_path, base_uri);
        if found.is_none() {
            self.missed.set(true);
        }
        found
    }
}
