//! Type and path resolution

pub mod data_type;
pub mod paths;

pub use data_type::{ResolvedType, infer_type_from_value, resolve_type};
pub use paths::{COMPONENT_EXTENSION, Mapping, ProjectLayout, is_dotted_path, short_name_span};
