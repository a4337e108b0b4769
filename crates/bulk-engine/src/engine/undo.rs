//! Undo: synthesize a compensating request from a history entry.
//!
//! Undo is best-effort. The engine replays a reverse action through the
//! normal executor; whether the backend can actually invert the original
//! (e.g. restore a deleted post) is the backend's contract.

use bulk_core::{ActionDescriptor, BulkRequest, HistoryEntry};

use crate::catalog::ActionCatalog;

/// Prefix for reverse actions that have no catalog inverse.
const UNDO_PREFIX: &str = "undo_";

/// Resolve the action id that compensates for `action_id`.
///
/// 1. the catalog's declared inverse, if any
/// 2. the original action, when `action_id` is itself a synthesized undo
/// 3. `undo_<action_id>`
fn reverse_action_id(entry: &HistoryEntry, catalog: &ActionCatalog) -> String {
    if let Some(inverse) = catalog
        .get(entry.content_type, &entry.action_id)
        .and_then(|action| action.inverse)
    {
        return inverse;
    }
    match entry.action_id.strip_prefix(UNDO_PREFIX) {
        Some(original) => original.to_string(),
        None => format!("{}{}", UNDO_PREFIX, entry.action_id),
    }
}

/// Build the reverse request for an entry.
///
/// Targets the items the original run succeeded on and carries the original
/// `additional_data`. The label is always `"Undo <original label>"`.
pub(super) fn reverse_request(entry: &HistoryEntry, catalog: &ActionCatalog) -> BulkRequest {
    let action_id = reverse_action_id(entry, catalog);

    let mut action = catalog
        .get(entry.content_type, &action_id)
        .unwrap_or_else(|| ActionDescriptor::new(action_id.clone(), action_id.clone()));
    action.label = format!("Undo {}", entry.action_label);
    action.inverse = Some(entry.action_id.clone());

    BulkRequest::new(entry.content_type, action, entry.item_ids.clone())
        .with_data(entry.additional_data.clone())
}
