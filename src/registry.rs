//! Internal storage for one scope: the entry map plus the singleton cache.
//!
//! Both maps live behind a single lock at the scope level so the invariant
//! "the cache never holds a key absent from the entries" survives concurrent
//! registration, resolution, and disposal.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entry::{AnyArc, ServiceEntry};
use crate::key::ServiceKey;

#[derive(Default)]
pub(crate) struct Registry {
    entries: HashMap<ServiceKey, Arc<ServiceEntry>>,
    singleton_cache: HashMap<ServiceKey, AnyArc>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores an entry, overwriting any prior registration at the key.
    /// Returns `true` when an existing registration was replaced.
    pub(crate) fn insert(&mut self, key: ServiceKey, entry: ServiceEntry) -> bool {
        // A replaced registration must not keep serving its old instance.
        self.singleton_cache.remove(&key);
        self.entries.insert(key, Arc::new(entry)).is_some()
    }

    pub(crate) fn get(&self, key: &ServiceKey) -> Option<Arc<ServiceEntry>> {
        self.entries.get(key).cloned()
    }

    pub(crate) fn contains(&self, key: &ServiceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes a registration and its cached instance, if any.
    pub(crate) fn remove(&mut self, key: &ServiceKey) -> Option<Arc<ServiceEntry>> {
        self.singleton_cache.remove(key);
        self.entries.remove(key)
    }

    pub(crate) fn cached(&self, key: &ServiceKey) -> Option<AnyArc> {
        self.singleton_cache.get(key).cloned()
    }

    /// Mirrors a materialized singleton into the cache, but only while the
    /// key still maps to the same entry. A concurrent re-registration or
    /// disposal during creation invalidates the mirror.
    pub(crate) fn cache_ready(
        &mut self,
        key: &ServiceKey,
        entry: &Arc<ServiceEntry>,
        value: AnyArc,
    ) {
        if let Some(current) = self.entries.get(key) {
            if Arc::ptr_eq(current, entry) {
                self.singleton_cache.insert(key.clone(), value);
            }
        }
    }

    pub(crate) fn keys(&self) -> Vec<ServiceKey> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empties the registry, handing back every entry for disposal.
    pub(crate) fn drain(&mut self) -> Vec<(ServiceKey, Arc<ServiceEntry>)> {
        self.singleton_cache.clear();
        self.entries.drain().collect()
    }

    pub(crate) fn snapshot(&self) -> Vec<(ServiceKey, Arc<ServiceEntry>)> {
        self.entries
            .iter()
            .map(|(k, e)| (k.clone(), e.clone()))
            .collect()
    }
}
