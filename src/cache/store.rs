//! Transient storage for cached recent-item lists.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use metrics::counter;
use time::{Duration, OffsetDateTime};

use crate::domain::items::ItemRecord;

use super::config::CacheConfig;
use super::events::Epoch;
use super::keys::TransientKey;
use super::lock::{read_guard, write_guard};

const SOURCE: &str = "cache::store";

const METRIC_TRANSIENT_HIT: &str = "vetrina_transient_hit_total";
const METRIC_TRANSIENT_MISS: &str = "vetrina_transient_miss_total";
const METRIC_TRANSIENT_STORE: &str = "vetrina_transient_store_total";

/// One cached query result.
#[derive(Debug, Clone)]
pub struct TransientEntry {
    pub items: Vec<ItemRecord>,
    pub expires_at: OffsetDateTime,
    pub epoch: Epoch,
}

/// Transient store for recent-item lists.
///
/// Entries live under an opaque per-instance key, expire after a fixed TTL,
/// and are bounded by LRU eviction. A process-wide display epoch invalidates
/// every entry at read time without enumerating keys: entries stamped with
/// an older epoch read as misses.
pub struct TransientStore {
    entries: RwLock<LruCache<TransientKey, TransientEntry>>,
    display_epoch: AtomicU64,
    ttl: Duration,
}

impl TransientStore {
    /// Create a new transient store with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.transient_capacity_non_zero())),
            display_epoch: AtomicU64::new(0),
            ttl: config.transient_ttl(),
        }
    }

    /// Read the entry for `key`, if present, unexpired, and epoch-current.
    pub fn get(&self, key: &TransientKey) -> Option<Vec<ItemRecord>> {
        self.get_at(key, OffsetDateTime::now_utc())
    }

    /// Read the entry for `key` as of `now`.
    ///
    /// Expired or epoch-lagging entries read as misses; they are evicted by
    /// LRU pressure or the next purge rather than removed here.
    pub fn get_at(&self, key: &TransientKey, now: OffsetDateTime) -> Option<Vec<ItemRecord>> {
        let mut entries = write_guard(&self.entries, SOURCE, "get");
        let Some(entry) = entries.get(key) else {
            counter!(METRIC_TRANSIENT_MISS, "reason" => "absent").increment(1);
            return None;
        };
        if entry.epoch != self.display_epoch.load(Ordering::SeqCst) {
            counter!(METRIC_TRANSIENT_MISS, "reason" => "stale").increment(1);
            return None;
        }
        if now >= entry.expires_at {
            counter!(METRIC_TRANSIENT_MISS, "reason" => "expired").increment(1);
            return None;
        }
        counter!(METRIC_TRANSIENT_HIT).increment(1);
        Some(entry.items.clone())
    }

    /// Store `items` under `key` with the configured TTL.
    pub fn set(&self, key: TransientKey, items: Vec<ItemRecord>) {
        self.set_at(key, items, OffsetDateTime::now_utc());
    }

    /// Store `items` under `key`, expiring `ttl` after `now`.
    pub fn set_at(&self, key: TransientKey, items: Vec<ItemRecord>, now: OffsetDateTime) {
        let entry = TransientEntry {
            items,
            expires_at: now + self.ttl,
            epoch: self.display_epoch.load(Ordering::SeqCst),
        };
        write_guard(&self.entries, SOURCE, "set").put(key, entry);
        counter!(METRIC_TRANSIENT_STORE).increment(1);
    }

    /// Delete the entry for `key`. Returns true when something was removed.
    pub fn delete(&self, key: &TransientKey) -> bool {
        write_guard(&self.entries, SOURCE, "delete").pop(key).is_some()
    }

    /// Delete every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = write_guard(&self.entries, SOURCE, "clear");
        let count = entries.len();
        entries.clear();
        count
    }

    /// Advance the display epoch, making every stored entry read as stale.
    pub fn advance_display_epoch(&self) -> Epoch {
        self.display_epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The current display epoch.
    pub fn display_epoch(&self) -> Epoch {
        self.display_epoch.load(Ordering::SeqCst)
    }

    /// Get the number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        read_guard(&self.entries, SOURCE, "len").len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use time::macros::datetime;
    use uuid::Uuid;

    use super::*;

    fn sample_item(title: &str) -> ItemRecord {
        ItemRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            excerpt: "An excerpt.".to_string(),
            permalink: "http://localhost:8080/posts/sample/".to_string(),
            category: "news".to_string(),
            published_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn transient_roundtrip() {
        let store = TransientStore::new(&CacheConfig::default());
        let key = TransientKey::new("recent-posts-1");

        assert!(store.get(&key).is_none());

        store.set(key.clone(), vec![sample_item("First")]);

        let cached = store.get(&key).expect("cached items");
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].title, "First");

        assert!(store.delete(&key));
        assert!(store.get(&key).is_none());
        assert!(!store.delete(&key));
    }

    #[test]
    fn empty_lists_are_cached() {
        let store = TransientStore::new(&CacheConfig::default());
        let key = TransientKey::new("recent-posts-1");

        store.set(key.clone(), Vec::new());

        let cached = store.get(&key).expect("cached empty list");
        assert!(cached.is_empty());
    }

    #[test]
    fn ttl_boundary() {
        let store = TransientStore::new(&CacheConfig::default());
        let key = TransientKey::new("recent-posts-1");
        let t0 = datetime!(2026-03-01 00:00:00 UTC);

        store.set_at(key.clone(), vec![sample_item("First")], t0);

        let just_before = t0 + Duration::hours(11) + Duration::minutes(59);
        assert!(store.get_at(&key, just_before).is_some());

        let at_expiry = t0 + Duration::hours(12);
        assert!(store.get_at(&key, at_expiry).is_none());

        let just_after = t0 + Duration::hours(12) + Duration::seconds(1);
        assert!(store.get_at(&key, just_after).is_none());
    }

    #[test]
    fn display_epoch_invalidates_previous_entries() {
        let store = TransientStore::new(&CacheConfig::default());
        let key = TransientKey::new("recent-posts-1");

        store.set(key.clone(), vec![sample_item("First")]);
        assert!(store.get(&key).is_some());

        store.advance_display_epoch();
        assert!(store.get(&key).is_none());

        // Entries written after the bump are current again
        store.set(key.clone(), vec![sample_item("Second")]);
        let cached = store.get(&key).expect("entry written after bump");
        assert_eq!(cached[0].title, "Second");
    }

    #[test]
    fn lru_eviction() {
        let config = CacheConfig {
            transient_capacity: 2,
            ..Default::default()
        };
        let store = TransientStore::new(&config);

        store.set(TransientKey::new("w1"), vec![sample_item("First")]);
        store.set(TransientKey::new("w2"), vec![sample_item("Second")]);

        // Capacity two holds both
        assert!(store.get(&TransientKey::new("w1")).is_some());
        assert!(store.get(&TransientKey::new("w2")).is_some());

        // Adding a third should evict the least recently used
        store.set(TransientKey::new("w3"), vec![sample_item("Third")]);

        assert!(store.get(&TransientKey::new("w1")).is_none()); // Evicted
        assert!(store.get(&TransientKey::new("w2")).is_some());
        assert!(store.get(&TransientKey::new("w3")).is_some());
    }

    #[test]
    fn clear_reports_removed_count() {
        let store = TransientStore::new(&CacheConfig::default());

        store.set(TransientKey::new("w1"), vec![sample_item("First")]);
        store.set(TransientKey::new("w2"), vec![sample_item("Second")]);
        assert_eq!(store.len(), 2);

        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
        assert_eq!(store.clear(), 0);
    }

    #[test]
    fn store_recovers_from_poisoned_lock() {
        let store = TransientStore::new(&CacheConfig::default());

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store
                .entries
                .write()
                .expect("entries lock should be acquired");
            panic!("poison entries lock");
        }));

        store.set(TransientKey::new("w1"), vec![sample_item("First")]);
        assert!(store.get(&TransientKey::new("w1")).is_some());
    }
}
