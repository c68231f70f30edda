//! Dotted component paths and where they may live on disk.

use crate::text::Span;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default extension of component files, without the dot
pub const COMPONENT_EXTENSION: &str = "cfc";

/// A logical dotted prefix served from a directory
/// (`"lib"` → `/srv/shared/lib` makes `lib.util.Strings` resolvable)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub prefix: String,
    pub directory: PathBuf,
}

impl Mapping {
    pub fn new(prefix: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            directory: directory.into(),
        }
    }

    /// The dotted path with this mapping's prefix removed, if it applies
    fn strip<'a>(&self, dotted_path: &'a str) -> Option<&'a str> {
        let prefix = self.prefix.trim_matches(|c| c == '/' || c == '.');
        if prefix.is_empty() || dotted_path.len() <= prefix.len() {
            return None;
        }
        let (head, rest) = dotted_path.split_at(prefix.len());
        (head.eq_ignore_ascii_case(prefix) && rest.starts_with('.')).then(|| &rest[1..])
    }
}

/// Where a project's components can be found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectLayout {
    root: Option<PathBuf>,
    mappings: Vec<Mapping>,
    extension: Option<String>,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    pub fn with_mappings(mut self, mappings: Vec<Mapping>) -> Self {
        self.mappings = mappings;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    pub fn extension(&self) -> &str {
        self.extension.as_deref().unwrap_or(COMPONENT_EXTENSION)
    }

    /// Files a dotted path may refer to, in resolution order: next to the
    /// referencing file, under the project root, then under each mapping.
    pub fn candidates(&self, dotted_path: &str, base_uri: &Path) -> Vec<PathBuf> {
        let dotted_path = dotted_path.trim();
        if !is_dotted_path(dotted_path) {
            return Vec::new();
        }

        let relative = self.relative_file(dotted_path);
        let mut candidates = Vec::new();

        if let Some(directory) = base_uri.parent() {
            candidates.push(directory.join(&relative));
        }
        if let Some(root) = &self.root {
            let rooted = root.join(&relative);
            if !candidates.contains(&rooted) {
                candidates.push(rooted);
            }
        }
        for mapping in &self.mappings {
            if let Some(rest) = mapping.strip(dotted_path) {
                candidates.push(mapping.directory.join(self.relative_file(rest)));
            }
        }

        candidates
    }

    /// Dotted path of a component file relative to the project root
    pub fn dotted_path_of(&self, uri: &Path) -> Option<String> {
        let relative = uri.strip_prefix(self.root.as_ref()?).ok()?;
        let relative = relative.with_extension("");
        let segments: Vec<&str> = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect::<Option<_>>()?;
        (!segments.is_empty()).then(|| segments.join("."))
    }

    fn relative_file(&self, dotted_path: &str) -> PathBuf {
        let mut path: PathBuf = dotted_path.split('.').collect();
        path.set_extension(self.extension());
        path
    }
}

/// Whether `value` looks like `a.b.C`: identifier segments joined by dots
pub fn is_dotted_path(value: &str) -> bool {
    !value.is_empty()
        && value.split('.').all(|segment| {
            let mut bytes = segment.bytes();
            bytes
                .next()
                .is_some_and(|first| first.is_ascii_alphabetic() || first == b'_')
                && bytes.all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-')
        })
}

/// Span of the last segment of a dotted path (`Bar` in `foo.Bar`)
pub fn short_name_span(text: &str, span: Span) -> Span {
    let value = span.slice(text);
    let trimmed_end = span.start + value.trim_end().len();
    let value = &text[span.start..trimmed_end];
    match value.rfind('.') {
        Some(dot) => Span::new(span.start + dot + 1, trimmed_end),
        None => Span::new(span.start + (value.len() - value.trim_start().len()), trimmed_end),
    }
}
