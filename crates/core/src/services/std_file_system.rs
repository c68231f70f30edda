//! File system implementation backed by `std::fs` and `walkdir`

use crate::error::Result;
use crate::interfaces::FileSystem;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Reads straight from disk
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl StdFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for StdFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_files(&self, root: &Path, extensions: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !exclude
                        .iter()
                        .any(|name| entry.file_name().to_str() == Some(name.as_str()))
            });

        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let matches = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)));
            if matches {
                files.push(entry.into_path());
            }
        }

        files.sort();
        tracing::debug!("Found {} source files under {}", files.len(), root.display());
        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_filters_and_excludes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("models")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("Application.cfc"), "component {}").unwrap();
        fs::write(root.join("models/User.CFC"), "component {}").unwrap();
        fs::write(root.join("models/readme.md"), "# models").unwrap();
        fs::write(root.join("node_modules/pkg/Dep.cfc"), "component {}").unwrap();

        let files = StdFileSystem
            .list_files(root, &["cfc".to_string()], &["node_modules".to_string()])
            .unwrap();

        assert_eq!(files, vec![root.join("Application.cfc"), root.join("models/User.CFC")]);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let result = StdFileSystem.read_to_string(&temp.path().join("Missing.cfc"));
        assert!(matches!(result, Err(crate::error::Error::IoError(_))));
    }
}
