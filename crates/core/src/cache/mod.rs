//! Project-wide index of parsed components

pub mod entity_cache;
pub mod inheritance;
pub mod prefix_index;

// Re-export the main cache type
pub use entity_cache::EntityCache;
pub use inheritance::{all_functions, ancestors, find_function, implicit_functions, inherited_functions};
pub use prefix_index::PrefixIndex;
