use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{
    definition_command, doc_command, index_command, init_command, parse_command, search_command,
    symbols_command, variables_command, watch_command,
};

#[derive(Parser, Debug)]
#[command(name = "cfml-lens")]
#[command(version, about, long_about = None, propagate_version = true)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug         Enable debug logging\n    CFML_LENS_ROOT=<dir>   Stop config discovery at <dir>")]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Project root (defaults to the directory of the nearest .cfml-lens.json)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index every component under a directory and print statistics
    #[command(visible_alias = "i")]
    Index {
        /// Directory to index (defaults to the current directory)
        path: Option<PathBuf>,
    },
    /// Parse a component file and print its structure
    #[command(visible_alias = "p")]
    Parse {
        /// Path to a .cfc file
        filepath: PathBuf,
    },
    /// Print the outline of a component or template
    Symbols {
        /// Path to a .cfc, .cfm or .cfml file
        filepath: PathBuf,
    },
    /// Search indexed components (or functions) by name prefix
    #[command(visible_alias = "s")]
    Search {
        /// Case-insensitive name prefix
        prefix: String,

        /// Search function names instead of component names
        #[arg(short, long)]
        functions: bool,
    },
    /// List the variables declared in a file, or visible at a line
    Variables {
        /// Path with optional line number (e.g., models/User.cfc:42)
        filepath: String,
    },
    /// Find where the symbol at a position is declared
    #[command(visible_alias = "d")]
    Definition {
        /// Path with line and column (e.g., handlers/Main.cfc:12:8)
        location: String,
    },
    /// Look up a built-in function or tag in the documentation directory
    Doc {
        /// Function or tag name
        name: String,
    },
    /// Keep the index up to date while files change
    Watch {
        /// Directory to watch (defaults to the current directory)
        path: Option<PathBuf>,
    },
    /// Write a default .cfml-lens.json
    Init {
        /// Directory to write into (defaults to the current directory)
        #[arg(short, long)]
        cwd: Option<PathBuf>,

        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },
}

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub json: bool,
    pub root: Option<PathBuf>,
}

impl Cli {
    /// Execute the parsed command line
    pub fn execute(self) -> Result<()> {
        let options = GlobalOptions {
            json: self.json,
            root: self.root,
        };
        self.command.execute(&options)
    }
}

impl Commands {
    /// Execute the command
    pub fn execute(self, options: &GlobalOptions) -> Result<()> {
        tracing::debug!("Executing {:?}", self);
        match self {
            Commands::Index { path } => index_command(path.as_deref(), options),
            Commands::Parse { filepath } => parse_command(&filepath, options),
            Commands::Symbols { filepath } => symbols_command(&filepath, options),
            Commands::Search { prefix, functions } => search_command(&prefix, functions, options),
            Commands::Variables { filepath } => variables_command(&filepath, options),
            Commands::Definition { location } => definition_command(&location, options),
            Commands::Doc { name } => doc_command(&name, options),
            Commands::Watch { path } => watch_command(path.as_deref(), options),
            Commands::Init { cwd, force } => init_command(cwd.as_deref(), force),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["cfml-lens", "search", "us", "--functions", "--json"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Search { prefix, functions } => {
                assert_eq!(prefix, "us");
                assert!(functions);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
