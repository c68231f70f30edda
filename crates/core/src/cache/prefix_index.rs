use std::collections::BTreeSet;
use std::ops::Bound;

/// Lowercased names kept in sorted order so that every name sharing a
/// prefix sits in one contiguous range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixIndex {
    names: BTreeSet<String>,
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the name was already present
    pub fn insert(&mut self, name: &str) -> bool {
        self.names.insert(name.to_lowercase())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    /// Names starting with `prefix`, case-insensitively, in sorted order.
    /// An empty prefix yields every name.
    pub fn with_prefix(&self, prefix: &str) -> impl Iterator<Item = &str> + '_ {
        let prefix = prefix.to_lowercase();
        self.names
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .take_while(move |name| name.starts_with(&prefix))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }
}
