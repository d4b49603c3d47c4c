//! Bounded, TTL-expiring response cache.
//!
//! Eviction prefers already-expired entries, then the oldest-inserted
//! live ones. This is deliberately not an LRU: reads never reorder
//! anything, so two processes with the same insert sequence hold the
//! same entries regardless of read traffic.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::types::DomainPayload;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: DomainPayload,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    insertion_order: VecDeque<String>,
}

/// Insertion-ordered cache bounded by entry count, shared across
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    state: Arc<Mutex<CacheState>>,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            max_entries: max_entries.max(1),
        }
    }

    /// Look up a live entry. An entry whose deadline has passed is a
    /// miss and is removed on the spot.
    pub fn get(&self, key: &str) -> Option<DomainPayload> {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap();
        let hit = match state.entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => None,
            None => return None,
        };
        if hit.is_none() {
            state.remove_key(key);
        }
        hit
    }

    /// Insert or replace an entry with a fresh deadline.
    ///
    /// A replaced key moves to the back of the insertion order; its
    /// earlier position is forgotten. The size bound is enforced here
    /// as well, so the cache never holds more than `max_entries` live
    /// entries even before the next prune.
    pub fn put(&self, key: String, value: DomainPayload, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        let mut state = self.state.lock().unwrap();
        if state
            .entries
            .insert(key.clone(), CacheEntry { value, expires_at })
            .is_some()
        {
            state.remove_from_order(&key);
        }
        state.insertion_order.push_back(key);
        if state.entries.len() > self.max_entries {
            state.prune_expired(Instant::now());
            state.evict_to_capacity(self.max_entries);
        }
    }

    /// Drop expired entries, then evict oldest-inserted entries until
    /// the count is within the bound.
    pub fn prune(&self) {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap();
        state.prune_expired(now);
        state.evict_to_capacity(self.max_entries);
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Test hook: drop everything.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.entries.clear();
        state.insertion_order.clear();
    }
}

impl CacheState {
    fn remove_key(&mut self, key: &str) {
        self.entries.remove(key);
        self.remove_from_order(key);
    }

    fn remove_from_order(&mut self, key: &str) {
        if let Some(index) = self
            .insertion_order
            .iter()
            .position(|candidate| candidate == key)
        {
            self.insertion_order.remove(index);
        }
    }

    fn prune_expired(&mut self, now: Instant) {
        let mut keep = VecDeque::with_capacity(self.insertion_order.len());
        while let Some(key) = self.insertion_order.pop_front() {
            let live = self
                .entries
                .get(&key)
                .map(|entry| entry.expires_at > now)
                .unwrap_or(false);
            if live {
                keep.push_back(key);
            } else {
                self.entries.remove(&key);
            }
        }
        self.insertion_order = keep;
    }

    fn evict_to_capacity(&mut self, max_entries: usize) {
        while self.entries.len() > max_entries {
            let Some(oldest) = self.insertion_order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }
}
