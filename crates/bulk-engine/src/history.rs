//! Action History Log
//!
//! Bounded, newest-first record of finished bulk operations. Used for
//! statistics and as the source for undo. Only the engine writes to it.

use parking_lot::RwLock;
use std::collections::VecDeque;

use bulk_core::{HistoryEntry, HistoryStats};

use crate::store::ScopedStore;

/// Store key for the persisted log.
const HISTORY_KEY: &str = "history";

/// Capped history log, persisted after every mutation.
pub struct ActionHistory {
    entries: RwLock<VecDeque<HistoryEntry>>,
    limit: usize,
    store: ScopedStore,
}

impl ActionHistory {
    /// Create an empty log keeping at most `limit` entries.
    pub fn new(limit: usize, store: ScopedStore) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(limit)),
            limit,
            store,
        }
    }

    /// Create a log restored from the store.
    pub fn load(limit: usize, store: ScopedStore) -> Self {
        let history = Self::new(limit, store);
        match history.store.load::<Vec<HistoryEntry>>(HISTORY_KEY) {
            Ok(Some(entries)) => {
                let mut restored: VecDeque<HistoryEntry> = entries.into();
                restored.truncate(limit);
                tracing::debug!("Restored {} history entries", restored.len());
                *history.entries.write() = restored;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to restore action history: {}", e),
        }
        history
    }

    /// Append an entry, evicting the oldest beyond the limit.
    ///
    /// Persists under the write lock so the store never lags a concurrent
    /// `clear`.
    pub fn record(&self, entry: HistoryEntry) {
        let mut entries = self.entries.write();
        entries.push_front(entry);
        entries.truncate(self.limit);
        self.persist(&entries);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.clear();
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            tracing::warn!("Failed to clear persisted history: {}", e);
        }
    }

    /// Entries, newest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.read().iter().cloned().collect()
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<HistoryEntry> {
        self.entries.read().front().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Totals folded over the whole log.
    pub fn stats(&self) -> HistoryStats {
        let entries = self.entries.read();
        HistoryStats::fold(entries.iter())
    }

    fn persist(&self, entries: &VecDeque<HistoryEntry>) {
        if let Err(e) = self.store.save(HISTORY_KEY, entries) {
            tracing::warn!("Failed to persist action history: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::gated::GatedStore;
    use crate::store::{KeyValueStore, MemoryStore};
    use bulk_core::{ActionDescriptor, BulkRequest, ContentType, ExecutionResult, ItemOutcome};
    use std::sync::Arc;
    use std::time::Duration;

    fn scoped(store: Arc<dyn KeyValueStore>) -> ScopedStore {
        ScopedStore::new(store, ContentType::Sermon)
    }

    fn entry(action: &str, successes: usize) -> HistoryEntry {
        let request = BulkRequest::new(
            ContentType::Sermon,
            ActionDescriptor::new(action, action),
            Vec::new(),
        );
        let mut result = ExecutionResult::default();
        for i in 0..successes {
            result
                .successful
                .push(ItemOutcome::succeeded((i as i64).into(), serde_json::Value::Null));
        }
        HistoryEntry::from_run(&request, &result)
    }

    #[test]
    fn test_keeps_newest_fifty() {
        let history = ActionHistory::new(50, scoped(Arc::new(MemoryStore::new())));
        for i in 0..60 {
            history.record(entry(&format!("op{}", i), 1));
        }

        assert_eq!(history.len(), 50);
        let entries = history.entries();
        assert_eq!(entries[0].action_id, "op59");
        assert_eq!(entries[49].action_id, "op10");
        assert_eq!(history.latest().unwrap().action_id, "op59");
    }

    #[test]
    fn test_persists_and_restores() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let history = ActionHistory::new(50, scoped(store.clone()));
        history.record(entry("publish", 2));
        history.record(entry("delete", 1));

        let restored = ActionHistory::load(50, scoped(store.clone()));
        assert_eq!(restored.entries(), history.entries());
        assert_eq!(restored.latest().unwrap().action_id, "delete");

        restored.clear();
        assert!(restored.is_empty());
        assert!(ActionHistory::load(50, scoped(store)).is_empty());
    }

    #[test]
    fn test_load_respects_smaller_limit() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let history = ActionHistory::new(50, scoped(store.clone()));
        for i in 0..10 {
            history.record(entry(&format!("op{}", i), 1));
        }

        let restored = ActionHistory::load(3, scoped(store));
        let ids: Vec<_> = restored.entries().into_iter().map(|e| e.action_id).collect();
        assert_eq!(ids, vec!["op9", "op8", "op7"]);
    }

    #[test]
    fn test_stats_fold_over_log() {
        let history = ActionHistory::new(50, scoped(Arc::new(MemoryStore::new())));
        history.record(entry("publish", 3));
        history.record(entry("publish", 2));
        history.record(entry("feature", 1));

        let stats = history.stats();
        assert_eq!(stats.total_operations, 3);
        assert_eq!(stats.total_successes, 6);
        assert_eq!(stats.by_action["publish"].count, 2);
        assert_eq!(stats.by_action["publish"].items_processed, 5);
        assert_eq!(stats.by_action["feature"].successes, 1);
    }

    #[test]
    fn test_store_follows_memory_under_concurrent_clear() {
        let (store, entered, release) = GatedStore::new();
        let store: Arc<dyn KeyValueStore> = Arc::new(store);
        let history = ActionHistory::new(50, scoped(Arc::clone(&store)));

        std::thread::scope(|s| {
            s.spawn(|| history.record(entry("publish", 1)));
            entered.recv().unwrap();

            let clearing = s.spawn(|| history.clear());
            std::thread::sleep(Duration::from_millis(50));
            assert!(!clearing.is_finished());
            release.send(()).unwrap();
        });

        assert!(history.is_empty());
        assert!(ActionHistory::load(50, scoped(store)).is_empty());
    }
}
