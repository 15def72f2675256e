use bytes::Bytes;
use dashmap::DashMap;

/// The node's share of the cache.
///
/// Plain key to payload map: no eviction, no expiry, no deletion. The last
/// write for a key on this node wins.
#[derive(Debug, Default)]
pub struct LocalStore {
    entries: DashMap<String, Bytes>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn put(&self, key: String, value: Bytes) {
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
