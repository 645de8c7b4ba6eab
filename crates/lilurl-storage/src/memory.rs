use crate::store::EntryStore;
use dashmap::DashMap;
use jiff::Timestamp;
use lilurl_core::{Entry, ShortCode};
use std::sync::Arc;
use tracing::{debug, trace};

/// In-memory implementation of [`EntryStore`] using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Entries are handed out as `Arc`s so no shard
/// lock is held while a caller works on an entry's counter.
#[derive(Debug, Default)]
pub struct InMemoryEntryStore {
    entries: DashMap<ShortCode, Arc<Entry>>,
}

impl InMemoryEntryStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Creates a new in-memory store with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
        }
    }
}

impl EntryStore for InMemoryEntryStore {
    fn add(&self, entry: Entry) -> Option<Arc<Entry>> {
        let code = entry.code().clone();
        let replaced = self.entries.insert(code.clone(), Arc::new(entry));
        if replaced.is_some() {
            debug!(code = %code, "replaced existing entry");
        } else {
            trace!(code = %code, "stored entry");
        }
        replaced
    }

    fn get(&self, code: &ShortCode) -> Option<Arc<Entry>> {
        self.entries.get(code).map(|entry| Arc::clone(entry.value()))
    }

    fn remove(&self, code: &ShortCode) -> bool {
        self.entries.remove(code).is_some()
    }

    fn evict(&self, code: &ShortCode, entry: &Arc<Entry>) -> bool {
        self.entries
            .remove_if(code, |_, stored| Arc::ptr_eq(stored, entry))
            .is_some()
    }

    fn purge_expired(&self, now: Timestamp) -> Vec<Arc<Entry>> {
        let mut purged = Vec::new();
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired(now);
            if !keep {
                purged.push(Arc::clone(entry));
            }
            keep
        });
        if !purged.is_empty() {
            debug!(purged = purged.len(), "purged expired entries");
        }
        purged
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;
    use lilurl_core::{Expiry, OwnerId};

    fn epoch() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn entry(c: &str, url: &str, expiry: Expiry) -> Entry {
        Entry::builder()
            .code(code(c))
            .original_url(url)
            .owner(OwnerId::new_unchecked("owner"))
            .created_at(epoch())
            .expiry(expiry)
            .remaining_accesses(10)
            .build()
    }

    #[test]
    fn add_and_get() {
        let store = InMemoryEntryStore::new();

        assert!(store
            .add(entry("abc123", "https://example.com", Expiry::Never))
            .is_none());

        let result = store.get(&code("abc123")).unwrap();
        assert_eq!(result.original_url(), "https://example.com");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_nonexistent() {
        let store = InMemoryEntryStore::new();
        assert!(store.get(&code("nope")).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn add_overwrites_same_code() {
        let store = InMemoryEntryStore::new();

        store.add(entry("abc123", "https://old.com", Expiry::Never));
        let replaced = store
            .add(entry("abc123", "https://new.com", Expiry::Never))
            .unwrap();

        assert_eq!(replaced.original_url(), "https://old.com");
        assert_eq!(
            store.get(&code("abc123")).unwrap().original_url(),
            "https://new.com"
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_does_not_evaluate_expiry() {
        let store = InMemoryEntryStore::new();
        store.add(entry(
            "abc123",
            "https://example.com",
            Expiry::After(SignedDuration::from_nanos(1)),
        ));

        // Long expired, but the store only answers lookups.
        assert!(store.get(&code("abc123")).is_some());
    }

    #[test]
    fn remove_is_idempotent() {
        let store = InMemoryEntryStore::new();
        store.add(entry("abc123", "https://example.com", Expiry::Never));

        assert!(store.remove(&code("abc123")));
        assert!(!store.remove(&code("abc123")));
        assert!(!store.remove(&code("never-there")));
        assert!(store.get(&code("abc123")).is_none());
    }

    #[test]
    fn evict_only_removes_the_same_instance() {
        let store = InMemoryEntryStore::new();
        store.add(entry("abc123", "https://old.com", Expiry::Never));
        let stale = store.get(&code("abc123")).unwrap();

        store.add(entry("abc123", "https://new.com", Expiry::Never));

        assert!(!store.evict(&code("abc123"), &stale));
        assert_eq!(
            store.get(&code("abc123")).unwrap().original_url(),
            "https://new.com"
        );

        let current = store.get(&code("abc123")).unwrap();
        assert!(store.evict(&code("abc123"), &current));
        assert!(store.get(&code("abc123")).is_none());
    }

    #[test]
    fn purge_expired_keeps_live_entries() {
        let store = InMemoryEntryStore::new();
        store.add(entry(
            "short-lived",
            "https://a.com",
            Expiry::After(SignedDuration::from_secs(10)),
        ));
        store.add(entry(
            "long-lived",
            "https://b.com",
            Expiry::After(SignedDuration::from_hours(1)),
        ));
        store.add(entry("forever", "https://c.com", Expiry::Never));

        let purged = store.purge_expired(epoch() + SignedDuration::from_secs(60));

        assert_eq!(purged.len(), 1);
        assert_eq!(purged[0].code(), &code("short-lived"));
        assert!(store.get(&code("short-lived")).is_none());
        assert!(store.get(&code("long-lived")).is_some());
        assert!(store.get(&code("forever")).is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_access() {
        let store = Arc::new(InMemoryEntryStore::new());
        let mut handles = vec![];

        for i in 0..10u64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.add(entry(
                    &format!("code-{:03}", i),
                    &format!("https://example{}.com", i),
                    Expiry::Never,
                ));
            }));
        }

        for i in 0..10u64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let _ = store.get(&code(&format!("code-{:03}", i)));
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        for i in 0..10u64 {
            let result = store.get(&code(&format!("code-{:03}", i))).unwrap();
            assert_eq!(result.original_url(), format!("https://example{}.com", i));
        }
    }
}
