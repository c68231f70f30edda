//! LRU memoisation in front of another documentation source

use crate::error::Result;
use crate::interfaces::{DocumentationLookup, EntityDescriptor};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Default number of descriptors kept in memory
pub const DEFAULT_CAPACITY: usize = 256;

/// Caches found descriptors. Misses and failures always reach the
/// wrapped source again.
pub struct CachedLookup<L> {
    inner: L,
    cache: Mutex<LruCache<String, EntityDescriptor>>,
}

impl<L: DocumentationLookup> CachedLookup<L> {
    pub fn new(inner: L, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or(NonZeroUsize::MIN.saturating_add(DEFAULT_CAPACITY - 1));
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Number of descriptors currently cached
    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

impl<L: DocumentationLookup> DocumentationLookup for CachedLookup<L> {
    async fn lookup(&self, name: &str) -> Result<Option<EntityDescriptor>> {
        let key = name.to_lowercase();
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(descriptor) = cache.get(&key) {
                return Ok(Some(descriptor.clone()));
            }
        }

        let found = self.inner.lookup(&key).await?;
        if let Some(descriptor) = &found {
            if let Ok(mut cache) = self.cache.lock() {
                cache.put(key, descriptor.clone());
            }
        }
        Ok(found)
    }

    async fn all_names(&self) -> Result<Vec<String>> {
        self.inner.all_names().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingLookup {
        calls: AtomicUsize,
    }

    impl DocumentationLookup for CountingLookup {
        async fn lookup(&self, name: &str) -> Result<Option<EntityDescriptor>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match name {
                "len" | "trim" | "now" => Ok(Some(EntityDescriptor {
                    name: name.to_string(),
                    ..EntityDescriptor::default()
                })),
                "fail" => Err(Error::DocumentationError("offline".to_string())),
                _ => Ok(None),
            }
        }

        async fn all_names(&self) -> Result<Vec<String>> {
            Ok(vec!["len".to_string(), "now".to_string(), "trim".to_string()])
        }
    }

    #[tokio::test]
    async fn test_found_descriptors_are_cached() {
        let lookup = CachedLookup::new(CountingLookup::default(), 8);

        assert_eq!(lookup.lookup("LEN").await.unwrap().unwrap().name, "len");
        assert_eq!(lookup.lookup("len").await.unwrap().unwrap().name, "len");
        assert_eq!(lookup.inner().calls.load(Ordering::SeqCst), 1);
        assert_eq!(lookup.len(), 1);
    }

    #[tokio::test]
    async fn test_misses_and_errors_are_not_cached() {
        let lookup = CachedLookup::new(CountingLookup::default(), 8);

        assert!(lookup.lookup("missing").await.unwrap().is_none());
        assert!(lookup.lookup("missing").await.unwrap().is_none());
        assert!(lookup.lookup("fail").await.is_err());
        assert_eq!(lookup.inner().calls.load(Ordering::SeqCst), 3);
        assert!(lookup.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recent() {
        let lookup = CachedLookup::new(CountingLookup::default(), 2);

        lookup.lookup("len").await.unwrap();
        lookup.lookup("trim").await.unwrap();
        lookup.lookup("now").await.unwrap();
        assert_eq!(lookup.len(), 2);

        lookup.lookup("len").await.unwrap();
        assert_eq!(lookup.inner().calls.load(Ordering::SeqCst), 4);
    }
}
