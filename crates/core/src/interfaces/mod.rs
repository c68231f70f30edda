//! Collaborator interfaces
//!
//! The engine reaches the outside world only through these traits. Default
//! implementations live in [`crate::services`].

pub mod component_locator;
pub mod documentation;
pub mod file_system;

pub use component_locator::{ChainLocator, ComponentLocator, NoopLocator};
pub use documentation::{DocumentationLookup, EntityDescriptor, EntityKind, ParameterDescriptor};
pub use file_system::FileSystem;
