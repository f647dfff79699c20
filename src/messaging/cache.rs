//! Bounded TTL cache used for nickname lookups.
//!
//! Entries expire `ttl` after insertion. When the cache is full, expired
//! entries are purged first and then the oldest entry is evicted.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
    capacity: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let entry = self.entries.get(key)?;
        if now.duration_since(entry.inserted_at) < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn insert_at(&self, key: K, value: V, now: Instant) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.purge_expired_at(now);
            if self.entries.len() >= self.capacity {
                self.evict_oldest();
            }
        }

        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.inserted_at) < self.ttl);
        before - self.entries.len()
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.inserted_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// User id to nickname
pub type NicknameCache = TtlCache<i64, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_until_ttl() {
        let cache: NicknameCache = TtlCache::new(8, Duration::from_secs(60));
        let t0 = Instant::now();
        cache.insert_at(2, "Bora".into(), t0);

        assert_eq!(cache.get_at(&2, t0 + Duration::from_secs(59)).as_deref(), Some("Bora"));
        assert!(cache.get_at(&2, t0 + Duration::from_secs(60)).is_none());
        assert!(cache.get_at(&3, t0).is_none());
    }

    #[test]
    fn test_purge_expired() {
        let cache: NicknameCache = TtlCache::new(8, Duration::from_secs(10));
        let t0 = Instant::now();
        cache.insert_at(1, "a".into(), t0);
        cache.insert_at(2, "b".into(), t0 + Duration::from_secs(5));

        assert_eq!(cache.purge_expired_at(t0 + Duration::from_secs(12)), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get_at(&2, t0 + Duration::from_secs(12)).is_some());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache: NicknameCache = TtlCache::new(2, Duration::from_secs(600));
        let t0 = Instant::now();
        cache.insert_at(1, "a".into(), t0);
        cache.insert_at(2, "b".into(), t0 + Duration::from_secs(1));
        cache.insert_at(3, "c".into(), t0 + Duration::from_secs(2));

        assert_eq!(cache.len(), 2);
        let now = t0 + Duration::from_secs(3);
        assert!(cache.get_at(&1, now).is_none());
        assert!(cache.get_at(&2, now).is_some());
        assert!(cache.get_at(&3, now).is_some());
    }

    #[test]
    fn test_full_cache_prefers_expired_over_oldest_live() {
        let cache: NicknameCache = TtlCache::new(2, Duration::from_secs(10));
        let t0 = Instant::now();
        cache.insert_at(1, "a".into(), t0);
        cache.insert_at(2, "b".into(), t0 + Duration::from_secs(8));
        // At t0+11 entry 1 is expired, entry 2 is live
        cache.insert_at(3, "c".into(), t0 + Duration::from_secs(11));

        let now = t0 + Duration::from_secs(12);
        assert!(cache.get_at(&2, now).is_some());
        assert!(cache.get_at(&3, now).is_some());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache: NicknameCache = TtlCache::new(1, Duration::from_secs(60));
        cache.insert(1, "old".into());
        cache.insert(1, "new".into());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&1).as_deref(), Some("new"));
    }
}
