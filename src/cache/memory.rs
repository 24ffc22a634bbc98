use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Process-local exact-match cache tier.
///
/// Keyed by literal strings (typically the product URL or a sub-query
/// prompt), values are serialized JSON payloads. Entries expire after a
/// fixed TTL; expired entries are dropped on read and swept on insert.
/// The mutex makes concurrent sweep-vs-insert safe under the
/// multi-threaded tokio runtime.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, MemoryEntry>>,
    ttl: Duration,
}

struct MemoryEntry {
    payload: String,
    inserted_at: Instant,
}

impl MemoryCache {
    /// Create a cache with the given entry TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a key, returning the payload if present and unexpired
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().expect("memory cache mutex poisoned");
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.payload.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert a payload, sweeping expired entries while holding the lock
    pub fn put(&self, key: impl Into<String>, payload: impl Into<String>) {
        let mut entries = self.entries.lock().expect("memory cache mutex poisoned");
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        entries.insert(
            key.into(),
            MemoryEntry {
                payload: payload.into(),
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, including any not yet swept
    pub fn len(&self) -> usize {
        self.entries.lock().expect("memory cache mutex poisoned").len()
    }

    /// True when the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
