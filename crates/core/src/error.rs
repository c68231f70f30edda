use std::io;

/// Errors that can occur during cfml-lens operations
///
/// Malformed CFML never produces one of these: parsers skip what they cannot
/// recognise. Errors are reserved for collaborators (file system,
/// documentation data) and configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Pattern error: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Documentation lookup error: {0}")]
    DocumentationError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for cfml-lens operations
pub type Result<T> = std::result::Result<T, Error>;
