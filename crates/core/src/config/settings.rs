use crate::error::{Error, Result};
use crate::resolve::{Mapping, ProjectLayout};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file
pub const CONFIG_FILE_NAME: &str = ".cfml-lens.json";

pub const DEFAULT_DOC_CACHE_CAPACITY: usize = 256;

/// One `.cfml-lens.json` file as written. Absent fields defer to files
/// further up the tree, then to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_extensions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_extensions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mappings: Option<Vec<Mapping>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_cache_capacity: Option<usize>,
}

impl ConfigFile {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse {}: {e}", path.display())))?;
        if let Some(directory) = path.parent() {
            config.anchor_paths(directory);
        }
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Relative directories are relative to the file that names them
    fn anchor_paths(&mut self, directory: &Path) {
        if let Some(docs_dir) = &mut self.docs_dir {
            if docs_dir.is_relative() {
                *docs_dir = directory.join(&*docs_dir);
            }
        }
        for mapping in self.mappings.iter_mut().flatten() {
            if mapping.directory.is_relative() {
                mapping.directory = directory.join(&mapping.directory);
            }
        }
    }

    /// Layer `nearer` over `self`, field by field
    pub fn merge(&mut self, nearer: ConfigFile) {
        macro_rules! take {
            ($($field:ident),+) => {
                $(if nearer.$field.is_some() {
                    self.$field = nearer.$field;
                })+
            };
        }
        take!(
            component_extensions,
            template_extensions,
            exclude,
            mappings,
            docs_dir,
            doc_cache_capacity
        );
    }
}

/// Effective settings after merging every config file that applies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub component_extensions: Vec<String>,
    pub template_extensions: Vec<String>,
    pub exclude: Vec<String>,
    pub mappings: Vec<Mapping>,
    pub docs_dir: Option<PathBuf>,
    pub doc_cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            component_extensions: vec!["cfc".to_string()],
            template_extensions: vec!["cfm".to_string(), "cfml".to_string()],
            exclude: vec!["node_modules".to_string(), ".git".to_string()],
            mappings: Vec::new(),
            docs_dir: None,
            doc_cache_capacity: DEFAULT_DOC_CACHE_CAPACITY,
        }
    }
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        let defaults = Config::default();
        Self {
            component_extensions: file.component_extensions.unwrap_or(defaults.component_extensions),
            template_extensions: file.template_extensions.unwrap_or(defaults.template_extensions),
            exclude: file.exclude.unwrap_or(defaults.exclude),
            mappings: file.mappings.unwrap_or(defaults.mappings),
            docs_dir: file.docs_dir,
            doc_cache_capacity: file.doc_cache_capacity.unwrap_or(defaults.doc_cache_capacity),
        }
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extensions.iter().any(|candidate| candidate.eq_ignore_ascii_case(extension)))
}

impl Config {
    pub fn is_component_file(&self, path: &Path) -> bool {
        has_extension(path, &self.component_extensions)
    }

    pub fn is_template_file(&self, path: &Path) -> bool {
        has_extension(path, &self.template_extensions)
    }

    pub fn is_source_file(&self, path: &Path) -> bool {
        self.is_component_file(path) || self.is_template_file(path)
    }

    /// Whether a directory between `root` and `path` is named in `exclude`,
    /// the same rule file listing applies
    pub fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(root) else {
            return false;
        };
        relative
            .parent()
            .into_iter()
            .flat_map(|parent| parent.components())
            .any(|part| self.exclude.iter().any(|name| part.as_os_str() == name.as_str()))
    }

    /// Component and template extensions together
    pub fn source_extensions(&self) -> Vec<String> {
        self.component_extensions
            .iter()
            .chain(&self.template_extensions)
            .cloned()
            .collect()
    }

    /// Where components of the project rooted at `root` are resolved
    pub fn layout(&self, root: &Path) -> ProjectLayout {
        let mut layout = ProjectLayout::new(root).with_mappings(self.mappings.clone());
        if let Some(extension) = self.component_extensions.first() {
            layout = layout.with_extension(extension.trim_start_matches('.'));
        }
        layout
    }
}
