use std::collections::HashMap;
use std::hash::Hash;

use orderflow_core::{DomainError, DomainResult};

/// In-memory keyed store, one per entity type.
///
/// Each value has exactly one owner (the store); everything else refers to it by
/// key, so every reader sees the same instance. Not synchronized: the workflow is
/// single-threaded and mutation goes through `&mut self`.
#[derive(Debug)]
pub struct InMemoryStore<K, V> {
    inner: HashMap<K, V>,
}

impl<K, V> InMemoryStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }
}

impl<K, V> Default for InMemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> InMemoryStore<K, V>
where
    K: Eq + Hash + core::fmt::Display,
{
    /// Insert a new value. Existing keys are never overwritten.
    pub fn insert(&mut self, key: K, value: V) -> DomainResult<()> {
        if self.inner.contains_key(&key) {
            return Err(DomainError::conflict(format!("{key} already exists")));
        }
        self.inner.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    pub fn require(&self, key: &K) -> DomainResult<&V> {
        self.inner.get(key).ok_or_else(DomainError::not_found)
    }

    pub fn require_mut(&mut self, key: &K) -> DomainResult<&mut V> {
        self.inner.get_mut(key).ok_or_else(DomainError::not_found)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_core::OrderId;

    #[test]
    fn insert_then_require() {
        let mut store = InMemoryStore::new();
        let id = OrderId::new();

        store.insert(id, "first").unwrap();

        assert_eq!(store.require(&id).unwrap(), &"first");
        assert!(store.contains(&id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_insert_is_a_conflict_and_keeps_original() {
        let mut store = InMemoryStore::new();
        let id = OrderId::new();
        store.insert(id, 1).unwrap();

        let err = store.insert(id, 2).unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(store.get(&id), Some(&1));
    }

    #[test]
    fn missing_key_is_not_found() {
        let mut store: InMemoryStore<OrderId, u8> = InMemoryStore::default();
        assert!(store.is_empty());
        assert_eq!(store.require(&OrderId::new()), Err(DomainError::NotFound));
        assert_eq!(
            store.require_mut(&OrderId::new()).unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn mutation_is_visible_to_later_reads() {
        let mut store = InMemoryStore::new();
        let id = OrderId::new();
        store.insert(id, vec![1]).unwrap();

        store.require_mut(&id).unwrap().push(2);

        assert_eq!(store.require(&id).unwrap(), &vec![1, 2]);
    }
}
