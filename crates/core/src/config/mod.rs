//! Configuration management for cfml-lens

pub mod loader;
mod settings;

// Re-export main types
pub use loader::{ConfigLoader, ROOT_ENV_VAR};
pub use settings::{CONFIG_FILE_NAME, Config, ConfigFile, DEFAULT_DOC_CACHE_CAPACITY};
