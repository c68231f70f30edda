//! File system interface
//!
//! The core never walks or reads the disk directly; everything goes through
//! this trait so hosts can supply open editor buffers or virtual files.

use crate::error::Result;
use std::path::{Path, PathBuf};

/// The only file operations the engine needs
pub trait FileSystem {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// List every file under `root` whose extension is one of `extensions`
    /// (compared case-insensitively, given without a dot), skipping
    /// directories named in `exclude`
    fn list_files(&self, root: &Path, extensions: &[String], exclude: &[String]) -> Result<Vec<PathBuf>>;

    /// Read a file's text
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn list_files(&self, root: &Path, extensions: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
        (**self).list_files(root, extensions, exclude)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        (**self).read_to_string(path)
    }
}
