//! cfml-lens - static language intelligence for CFML
//!
//! This crate provides functionality to:
//! - Parse CFML components and templates (tag and script dialects) into
//!   components, functions, properties and scoped variables
//! - Resolve dotted component paths, inheritance chains and implicit accessors
//! - Index a project in an in-memory cache with prefix search
//! - Answer position-anchored queries such as outlines and definitions
pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod indexer;
pub mod interfaces;
pub mod parser;
pub mod resolve;
pub mod services;
pub mod symbols;
pub mod text;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

// Re-export main API components
pub use cache::EntityCache;
pub use config::{Config, ConfigLoader};
pub use document::{Document, DocumentContext};
pub use indexer::{FileUpdate, IndexStats, Indexer};
pub use interfaces::{ComponentLocator, DocumentationLookup, FileSystem};
pub use parser::{analyze_variables, parse_component};
pub use resolve::ProjectLayout;
