use jiff::Timestamp;
use lilurl_core::{Entry, ShortCode};
use std::sync::Arc;

/// Storage for entries, keyed by short code.
///
/// Every method is a single linearizable step and is safe to call from
/// many threads at once. `get` neither mutates nor looks at expiry; callers
/// decide liveness and evict through [`EntryStore::evict`].
pub trait EntryStore: Send + Sync + 'static {
    /// Inserts an entry, replacing any entry stored under the same code.
    /// Returns the replaced entry.
    fn add(&self, entry: Entry) -> Option<Arc<Entry>>;

    /// Retrieves the entry for a given short code.
    fn get(&self, code: &ShortCode) -> Option<Arc<Entry>>;

    /// Deletes the entry for a given short code.
    /// Returns `true` if an entry existed and was removed.
    fn remove(&self, code: &ShortCode) -> bool;

    /// Removes `code` only while it still maps to `entry`.
    ///
    /// A reader that found an entry expired uses this so it cannot throw
    /// away a fresh entry written under the same code in the meantime.
    fn evict(&self, code: &ShortCode, entry: &Arc<Entry>) -> bool;

    /// Removes every entry that is expired at `now` and returns them.
    fn purge_expired(&self, now: Timestamp) -> Vec<Arc<Entry>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
