//! CFML source parsing: tags, attributes, documentation blocks and the
//! declarations assembled from them.

pub mod attributes;
pub mod component;
pub mod doc_block;
pub mod functions;
pub mod properties;
pub mod query;
pub mod tags;
pub mod variables;

// Re-export commonly used items
pub use attributes::{Attribute, Attributes, parse_attributes};
pub use component::parse_component;
pub use doc_block::{DocBlock, parse_doc_block};
pub use functions::{function_containing, parse_functions};
pub use properties::{implicit_accessors, parse_properties};
pub use query::select_column_names;
pub use tags::{Tag, scan_tags, scan_tags_by_name};
pub use variables::{VariableAnalyzer, analyze_variables, resolve_unscoped};
