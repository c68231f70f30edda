pub mod definition;
pub mod doc;
pub mod index;
pub mod init;
pub mod parse;
pub mod search;
pub mod symbols;
pub mod variables;
pub mod watch;

pub use definition::definition_command;
pub use doc::doc_command;
pub use index::index_command;
pub use init::init_command;
pub use parse::parse_command;
pub use search::search_command;
pub use symbols::symbols_command;
pub use variables::variables_command;
pub use watch::watch_command;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// `path` if given, otherwise the current directory
pub(crate) fn directory_or_cwd(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => std::env::current_dir().context("Failed to get current directory"),
    }
}
