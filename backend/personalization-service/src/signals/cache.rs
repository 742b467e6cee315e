//! Per-actor signal history cache
//!
//! Process-local, TTL-bounded and capped at `max_entries`. Each entry carries
//! the store generation it was read at; a lookup with any other generation
//! misses, so writes made by another instance retire the entry too. A zero
//! TTL disables caching.

use crate::store::SignalHistory;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default entry cap
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Clone)]
struct CachedHistory {
    history: SignalHistory,
    generation: u64,
    expires_at: Instant,
}

impl CachedHistory {
    #[inline]
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug)]
pub struct SignalCache {
    entries: DashMap<String, CachedHistory>,
    ttl: Duration,
    max_entries: usize,
}

impl SignalCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_limits(ttl, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_limits(ttl: Duration, max_entries: usize) -> Self {
        debug!(ttl_secs = ttl.as_secs(), max_entries, "Initializing signal cache");
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Cached history, only if it was read at `generation` and is still fresh
    pub fn get(&self, actor_id: &str, generation: u64) -> Option<SignalHistory> {
        let entry = self.entries.get(actor_id)?;
        if entry.is_expired() || entry.generation != generation {
            // Release the read guard before removing
            drop(entry);
            self.entries.remove(actor_id);
            return None;
        }
        Some(entry.history.clone())
    }

    pub fn insert(&self, actor_id: &str, generation: u64, history: SignalHistory) {
        if self.ttl.is_zero() {
            return;
        }
        let Some(expires_at) = Instant::now().checked_add(self.ttl) else {
            return;
        };

        if !self.entries.contains_key(actor_id) {
            self.enforce_limits();
        }

        self.entries.insert(
            actor_id.to_string(),
            CachedHistory {
                history,
                generation,
                expires_at,
            },
        );
    }

    pub fn invalidate(&self, actor_id: &str) {
        if self.entries.remove(actor_id).is_some() {
            debug!(actor_id = actor_id, "Invalidated cached signals");
        }
    }

    /// Full reload: every actor re-reads from the store
    pub fn invalidate_all(&self) {
        let count = self.entries.len();
        self.entries.clear();
        debug!(entries = count, "Cleared signal cache");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Make room for one more entry: drop expired entries first, then evict
    /// 10% (at least one) in iteration order
    fn enforce_limits(&self) {
        if self.entries.len() < self.max_entries {
            return;
        }

        self.entries.retain(|_, entry| !entry.is_expired());
        if self.entries.len() < self.max_entries {
            return;
        }

        let evict_count = (self.entries.len() + 1 - self.max_entries).max(self.entries.len() / 10);
        warn!(
            current_entries = self.entries.len(),
            evict_count, "Signal cache full, evicting entries"
        );

        let keys_to_evict: Vec<_> = self
            .entries
            .iter()
            .take(evict_count)
            .map(|entry| entry.key().clone())
            .collect();
        for key in keys_to_evict {
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with_task() -> SignalHistory {
        let mut history = SignalHistory::default();
        history.pending_tasks.insert("ordersPending".to_string(), true);
        history
    }

    #[test]
    fn test_insert_and_get() {
        let cache = SignalCache::new(Duration::from_secs(60));
        cache.insert("u1", 0, history_with_task());

        assert_eq!(cache.get("u1", 0), Some(history_with_task()));
        assert_eq!(cache.get("u2", 0), None);
    }

    #[test]
    fn test_newer_generation_misses_and_evicts() {
        let cache = SignalCache::new(Duration::from_secs(60));
        cache.insert("u1", 3, history_with_task());

        assert!(cache.get("u1", 4).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_single_actor() {
        let cache = SignalCache::new(Duration::from_secs(60));
        cache.insert("u1", 0, history_with_task());
        cache.insert("u2", 0, history_with_task());

        cache.invalidate("u1");

        assert!(cache.get("u1", 0).is_none());
        assert!(cache.get("u2", 0).is_some());
    }

    #[test]
    fn test_invalidate_all() {
        let cache = SignalCache::new(Duration::from_secs(60));
        cache.insert("u1", 0, history_with_task());
        cache.insert("u2", 0, history_with_task());

        cache.invalidate_all();

        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_ttl_disables_caching() {
        let cache = SignalCache::new(Duration::ZERO);
        cache.insert("u1", 0, history_with_task());

        assert!(cache.get("u1", 0).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_unrepresentable_expiry_skips_caching() {
        let cache = SignalCache::new(Duration::from_secs(u64::MAX));
        cache.insert("u1", 0, history_with_task());

        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entry_is_evicted_on_read() {
        let cache = SignalCache::new(Duration::from_millis(1));
        cache.insert("u1", 0, history_with_task());
        std::thread::sleep(Duration::from_millis(5));

        assert!(cache.get("u1", 0).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entry_cap_is_enforced() {
        let cache = SignalCache::with_limits(Duration::from_secs(60), 5);
        for i in 0..50 {
            cache.insert(&format!("u{}", i), 0, history_with_task());
            assert!(cache.len() <= 5);
        }

        assert!(cache.get("u49", 0).is_some());
    }

    #[test]
    fn test_expired_entries_are_dropped_before_live_ones() {
        let cache = SignalCache::with_limits(Duration::from_millis(1), 2);
        cache.insert("stale-1", 0, history_with_task());
        cache.insert("stale-2", 0, history_with_task());
        std::thread::sleep(Duration::from_millis(5));

        cache.insert("fresh", 0, history_with_task());

        // Only the new entry survives; nothing live had to be evicted
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_refreshing_existing_actor_does_not_evict() {
        let cache = SignalCache::with_limits(Duration::from_secs(60), 2);
        cache.insert("u1", 0, history_with_task());
        cache.insert("u2", 0, history_with_task());

        cache.insert("u2", 1, SignalHistory::default());

        assert!(cache.get("u1", 0).is_some());
        assert_eq!(cache.get("u2", 1), Some(SignalHistory::default()));
    }
}
