//! Default implementations of the collaborator interfaces

pub mod cached_lookup;
pub mod file_system_locator;
pub mod local_documentation;
pub mod memory_file_system;
pub mod std_file_system;

pub use cached_lookup::CachedLookup;
pub use file_system_locator::FileSystemLocator;
pub use local_documentation::LocalDocumentation;
pub use memory_file_system::MemoryFileSystem;
pub use std_file_system::StdFileSystem;
