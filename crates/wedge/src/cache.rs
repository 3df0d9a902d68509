use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;

/// Read-through cache handed to whoever needs it. Misses run the loader once
/// and remember successful results; failed loads are retried next time.
#[derive(Debug)]
pub struct ReadThroughCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for ReadThroughCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> ReadThroughCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    pub fn get_or_load(&self, key: &K, load: impl FnOnce(&K) -> Option<V>) -> Option<V> {
        if let Some(v) = self.get(key) {
            return Some(v);
        }
        let value = load(key)?;
        self.entries.write().insert(key.clone(), value.clone());
        Some(value)
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.write().insert(key, value);
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.write().remove(key);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
