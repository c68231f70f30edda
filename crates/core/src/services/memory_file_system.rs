//! In-memory file system for editor buffers and tests

use crate::error::{Error, Result};
use crate::interfaces::FileSystem;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Files held in memory, keyed by path
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }

    pub fn remove(&mut self, path: &Path) -> Option<String> {
        self.files.remove(path)
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn list_files(&self, root: &Path, extensions: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
        Ok(self
            .files
            .keys()
            .filter(|path| path.starts_with(root))
            .filter(|path| {
                path.strip_prefix(root).is_ok_and(|relative| {
                    !relative
                        .parent()
                        .into_iter()
                        .flat_map(|parent| parent.components())
                        .any(|part| exclude.iter().any(|name| part.as_os_str() == name.as_str()))
                })
            })
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)))
            })
            .cloned()
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            Error::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not loaded", path.display()),
            ))
        })
    }
}
