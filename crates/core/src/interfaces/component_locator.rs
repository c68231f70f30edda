//! Dotted-path resolution interface

use std::path::{Path, PathBuf};

/// Resolves a dotted component path (`models.user.User`) referenced from
/// `base_uri` to the identity of a component file.
///
/// Implementations try the referencing file's directory first, then the
/// project root, then configured mappings; they differ only in how they
/// decide that a candidate exists.
pub trait ComponentLocator {
    fn locate(&self, dotted_path: &str, base_uri: &Path) -> Option<PathBuf>;
}

impl<L: ComponentLocator + ?Sized> ComponentLocator for &L {
    fn locate(&self, dotted_path: &str, base_uri: &Path) -> Option<PathBuf> {
        (**self).locate(dotted_path, base_uri)
    }
}

/// Tries each locator in order and returns the first hit
pub struct ChainLocator<'a> {
    locators: Vec<&'a dyn ComponentLocator>,
}

impl<'a> ChainLocator<'a> {
    pub fn new(locators: Vec<&'a dyn ComponentLocator>) -> Self {
        Self { locators }
    }
}

impl ComponentLocator for ChainLocator<'_> {
    fn locate(&self, dotted_path: &str, base_uri: &Path) -> Option<PathBuf> {
        self.locators
            .iter()
            .find_map(|locator| locator.locate(dotted_path, base_uri))
    }
}

/// A locator that never resolves anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLocator;

impl ComponentLocator for NoopLocator {
    fn locate(&self, _dotted_path: &str, _base_uri: &Path) -> Option<PathBuf> {
        None
    }
}
