//! Component locator that checks candidate files on a file system

use crate::interfaces::{ComponentLocator, FileSystem};
use crate::resolve::ProjectLayout;
use std::path::{Path, PathBuf};

/// Resolves dotted paths to the first candidate file that exists
pub struct FileSystemLocator<F> {
    file_system: F,
    layout: ProjectLayout,
}

impl<F: FileSystem> FileSystemLocator<F> {
    pub fn new(file_system: F, layout: ProjectLayout) -> Self {
        Self { file_system, layout }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }
}

impl<F: FileSystem> ComponentLocator for FileSystemLocator<F> {
    fn locate(&self, dotted_path: &str, base_uri: &Path) -> Option<PathBuf> {
        let found = self
            .layout
            .candidates(dotted_path, base_uri)
            .into_iter()
            .find(|candidate| self.file_system.exists(candidate));
        if found.is_none() {
            tracing::debug!("No file for '{}' from {}", dotted_path, base_uri.display());
        }
        found
    }
}
