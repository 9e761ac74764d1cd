//! Sharded, concurrent, in-memory key index.
//!
//! Every live key maps to the location of its current value:
//! `(file_id, value_pos, value_len)`. The map is split across `N`
//! independently-locked shards, chosen by a hash of the key, so that a `get`
//! on one key never blocks a `put` on an unrelated one.
use std::collections::HashMap;
use std::sync::RwLock;

/// Location of a value within its containing data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// File-id of the data file holding the value.
    pub file_id: i64,
    /// Absolute byte offset of the value payload within that file.
    pub value_pos: u32,
    /// Length of the value payload in bytes.
    pub value_len: u16,
}

/// Sharded concurrent map from key to [`IndexEntry`].
pub struct Index {
    shards: Vec<RwLock<HashMap<Vec<u8>, IndexEntry>>>,
}

impl Index {
    /// Builds an index with `shard_count` shards.
    ///
    /// # Panics
    ///
    /// Panics if `shard_count` is 0.
    #[must_use]
    pub fn new(shard_count: usize) -> Self {
        assert!(shard_count > 0, "shard_count must be > 0");
        let mut shards = Vec::with_capacity(shard_count);
        for _ in 0..shard_count {
            shards.push(RwLock::new(HashMap::new()));
        }
        Self { shards }
    }

    /// Number of shards backing this index.
    #[must_use]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Looks up the current location of `key`, if any.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<IndexEntry> {
        let shard = self.shard_for(key);
        shard.read().expect("index shard lock poisoned").get(key).copied()
    }

    /// Inserts or overwrites the location of `key`.
    pub fn put(&self, key: Vec<u8>, entry: IndexEntry) {
        let shard = self.shard_for(&key);
        shard
            .write()
            .expect("index shard lock poisoned")
            .insert(key, entry);
    }

    /// Returns `true` if `key` currently has a live entry.
    #[must_use]
    pub fn contains(&self, key: &[u8]) -> bool {
        let shard = self.shard_for(key);
        shard.read().expect("index shard lock poisoned").contains_key(key)
    }

    /// Removes `key`'s entry, if present.
    pub fn remove(&self, key: &[u8]) {
        let shard = self.shard_for(key);
        shard.write().expect("index shard lock poisoned").remove(key);
    }

    /// Total number of live keys across all shards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.read().expect("index shard lock poisoned").len())
            .sum()
    }

    /// `true` if the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn shard_for(&self, key: &[u8]) -> &RwLock<HashMap<Vec<u8>, IndexEntry>> {
        let idx = (bloom::hash64(key) as usize) % self.shards.len();
        &self.shards[idx]
    }
}
