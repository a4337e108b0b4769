//! Selection Set
//!
//! Tracks which items are chosen for the next bulk action. The set never
//! grows past the selection ceiling, and every mutation is written through to
//! the scoped store so a reload restores the operator's selection.
//!
//! Persistence is a side effect: a store failure is logged and the in-memory
//! mutation stands.

use parking_lot::RwLock;

use bulk_core::ItemId;

use crate::store::ScopedStore;

/// Store key for the persisted selection.
const SELECTION_KEY: &str = "selection";

/// What a `toggle` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// Adding would exceed the ceiling; selection unchanged.
    Rejected,
}

/// Ceiling-bounded, persisted set of selected item ids.
///
/// Insertion order is kept so persisted selections and `select_all`
/// truncation are deterministic.
pub struct SelectionSet {
    ids: RwLock<Vec<ItemId>>,
    max_selection: usize,
    store: ScopedStore,
}

impl SelectionSet {
    /// Create an empty selection.
    pub fn new(max_selection: usize, store: ScopedStore) -> Self {
        Self {
            ids: RwLock::new(Vec::new()),
            max_selection,
            store,
        }
    }

    /// Create a selection restored from the store.
    ///
    /// A missing or unreadable value yields an empty selection. A persisted
    /// selection larger than the current ceiling is truncated.
    pub fn load(max_selection: usize, store: ScopedStore) -> Self {
        let selection = Self::new(max_selection, store);
        match selection.store.load::<Vec<ItemId>>(SELECTION_KEY) {
            Ok(Some(ids)) => {
                let restored = dedup_truncate(ids, max_selection);
                tracing::debug!(
                    "Restored {} selected {} items",
                    restored.len(),
                    selection.store.content_type()
                );
                *selection.ids.write() = restored;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to restore selection: {}", e),
        }
        selection
    }

    pub fn max_selection(&self) -> usize {
        self.max_selection
    }

    // =========================================================================
    // Mutation Methods (all persist)
    // =========================================================================

    /// Flip membership of one item.
    ///
    /// The store is written while the lock is held, so concurrent mutations
    /// reach the store in the same order as memory.
    pub fn toggle(&self, id: ItemId) -> Toggle {
        let mut ids = self.ids.write();
        let outcome = if let Some(pos) = ids.iter().position(|existing| *existing == id) {
            ids.remove(pos);
            Toggle::Removed
        } else if ids.len() >= self.max_selection {
            tracing::warn!(
                "Selection ceiling of {} reached, ignoring {}",
                self.max_selection,
                id
            );
            return Toggle::Rejected;
        } else {
            ids.push(id);
            Toggle::Added
        };
        self.persist(&ids);
        outcome
    }

    /// Replace the selection with the first `max_selection` distinct ids.
    ///
    /// Returns the resulting selection size.
    pub fn select_all(&self, ids: impl IntoIterator<Item = ItemId>) -> usize {
        let requested: Vec<ItemId> = ids.into_iter().collect();
        let requested_len = requested.len();
        let selected = dedup_truncate(requested, self.max_selection);
        if selected.len() < requested_len {
            tracing::debug!(
                "select_all kept {} of {} ids",
                selected.len(),
                requested_len
            );
        }
        let len = selected.len();
        let mut ids = self.ids.write();
        *ids = selected;
        self.persist(&ids);
        len
    }

    /// Empty the selection.
    pub fn deselect_all(&self) {
        let mut ids = self.ids.write();
        ids.clear();
        if let Err(e) = self.store.remove(SELECTION_KEY) {
            tracing::warn!("Failed to clear persisted selection: {}", e);
        }
    }

    // =========================================================================
    // Read Methods
    // =========================================================================

    pub fn contains(&self, id: &ItemId) -> bool {
        self.ids.read().contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.read().is_empty()
    }

    /// Snapshot of the selected ids in insertion order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.ids.read().clone()
    }

    /// Whether every visible item is selected. False for an empty page.
    pub fn is_all_selected(&self, visible: &[ItemId]) -> bool {
        let ids = self.ids.read();
        !visible.is_empty() && visible.iter().all(|id| ids.contains(id))
    }

    /// Whether some, but not all, visible items are selected.
    pub fn is_some_selected(&self, visible: &[ItemId]) -> bool {
        let ids = self.ids.read();
        let selected = visible.iter().filter(|id| ids.contains(id)).count();
        selected > 0 && selected < visible.len()
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn persist(&self, ids: &[ItemId]) {
        if let Err(e) = self.store.save(SELECTION_KEY, &ids) {
            tracing::warn!("Failed to persist selection: {}", e);
        }
    }
}

/// Drop duplicates (keeping the first occurrence) and cap the length.
fn dedup_truncate(ids: Vec<ItemId>, max: usize) -> Vec<ItemId> {
    let mut out: Vec<ItemId> = Vec::with_capacity(ids.len().min(max));
    for id in ids {
        if out.len() == max {
            break;
        }
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
