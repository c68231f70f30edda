pub mod cli;
pub mod commands;
pub mod display;
pub mod utils;
pub mod workspace;

// Re-export commonly used items
pub use cli::{Cli, Commands, GlobalOptions};
pub use workspace::Workspace;
