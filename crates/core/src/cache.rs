// In-memory TTL cache.
//
// Independent of the registry: its own readers-writer lock, its own
// lifetime rules. The server layers it read-through over resolution
// results and clears it whenever the snapshot swaps.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch a live entry. Expired entries read as absent; they are
    /// physically removed by `purge_expired`.
    pub fn get(&self, key: &str) -> Option<V> {
        let guard = self.entries.read().expect("cache lock poisoned");
        let entry = guard.get(key)?;
        if Instant::now() >= entry.expires_at {
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.insert_with_ttl(key, value, self.ttl);
    }

    pub fn insert_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let mut guard = self.entries.write().expect("cache lock poisoned");
        guard.insert(
            key.into(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Remove one entry. Returns whether it existed.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut guard = self.entries.write().expect("cache lock poisoned");
        guard.remove(key).is_some()
    }

    /// Remove every entry whose key starts with the prefix. Returns how
    /// many were dropped.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut guard = self.entries.write().expect("cache lock poisoned");
        let before = guard.len();
        guard.retain(|key, _| !key.starts_with(prefix));
        before - guard.len()
    }

    pub fn clear(&self) {
        let mut guard = self.entries.write().expect("cache lock poisoned");
        guard.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn purge_expired(&self) {
        let now = Instant::now();
        let mut guard = self.entries.write().expect("cache lock poisoned");
        guard.retain(|_, entry| now < entry.expires_at);
    }
}
