//! In-process TTL cache.
//!
//! Used by the data-driven analyzer to remember column samples and overlap
//! scores between candidate checks. Entries expire a fixed time after
//! insertion.
//!
//! # Design
//!
//! - `DashMap` storage, safe to share behind an `Arc`
//! - Lazy eviction: an expired entry is removed when it is next read
//! - `purge_expired` sweeps everything at once
//! - Concurrent inserts of the same key race; the last write wins

use std::hash::Hash;
use std::time::{Duration, Instant};

use dashmap::DashMap;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Key → value map whose entries live for a fixed duration.
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, Entry<V>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Get a live value. Expired entries are dropped and report a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let hit = {
            let entry = self.entries.get(key)?;
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.value.clone())
            }
        };
        if hit.is_none() {
            self.entries.remove_if(key, |_, e| e.is_expired(now));
        }
        hit
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(
            key,
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
