//! Discovery of `.cfml-lens.json` files.

use super::settings::{CONFIG_FILE_NAME, Config, ConfigFile};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Environment variable naming the directory where the upward search stops
pub const ROOT_ENV_VAR: &str = "CFML_LENS_ROOT";

/// Loads the effective configuration for a path by walking up the
/// directory tree and layering every config file found, nearest last.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the current directory
    pub fn load() -> Result<Config> {
        match std::env::current_dir() {
            Ok(cwd) => Self::load_from_path(&cwd),
            Err(_) => Ok(Config::default()),
        }
    }

    /// Load configuration for `path`, stopping at `$CFML_LENS_ROOT` or,
    /// failing that, at `$HOME`
    pub fn load_from_path(path: &Path) -> Result<Config> {
        let boundary = std::env::var(ROOT_ENV_VAR)
            .ok()
            .or_else(|| std::env::var("HOME").ok())
            .map(PathBuf::from);
        Self::load_with_boundary(path, boundary.as_deref())
    }

    /// Load configuration for `path`, searching no higher than `boundary`
    pub fn load_with_boundary(path: &Path, boundary: Option<&Path>) -> Result<Config> {
        let files = Self::config_files(path, boundary);
        if files.is_empty() {
            tracing::debug!("No config files found for {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let mut merged = ConfigFile::default();
        // farthest first so nearer files override
        for file in files.iter().rev() {
            tracing::debug!("Merging config from {:?}", file);
            merged.merge(ConfigFile::load_from_file(file)?);
        }
        Ok(merged.into())
    }

    /// Config files that apply to `path`, nearest first
    pub fn config_files(path: &Path, boundary: Option<&Path>) -> Vec<PathBuf> {
        let mut check_path = if path.is_file() {
            path.parent().unwrap_or(path)
        } else {
            path
        };
        let mut files = Vec::new();

        loop {
            let candidate = check_path.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                files.push(candidate);
            }

            if boundary.is_some_and(|boundary| check_path == boundary) {
                break;
            }
            match check_path.parent() {
                Some(parent) => check_path = parent,
                None => break,
            }
        }

        files
    }

    /// The nearest config file for `path`, if any
    pub fn find_config_file(path: &Path, boundary: Option<&Path>) -> Option<PathBuf> {
        Self::config_files(path, boundary).into_iter().next()
    }

    /// Directory of the nearest config file, taken as the project root
    pub fn project_root(path: &Path, boundary: Option<&Path>) -> Option<PathBuf> {
        Self::find_config_file(path, boundary)?.parent().map(Path::to_path_buf)
    }
}
