pub mod component;
pub mod data_type;
pub mod function;
pub mod position;
pub mod property;
pub mod scope;
pub mod variable;

// Re-export commonly used types
pub use component::{Component, ComponentFunctions, ComponentProperties, ComponentReference};
pub use data_type::DataType;
pub use function::{Access, Argument, Signature, UserFunction};
pub use position::{Location, Position, Range};
pub use property::Property;
pub use scope::{SCOPE_PREFIXES, SCOPE_RESOLUTION_PRECEDENCE, Scope};
pub use variable::{Variable, VariableKind};
