//! History entries and the statistics folded from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::action::{ActionData, BulkRequest};
use crate::item::{ContentType, ItemId};
use crate::outcome::ExecutionResult;

/// Record of one finished bulk operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub action_id: String,
    pub action_label: String,
    pub content_type: ContentType,
    pub item_count: usize,
    pub success_count: usize,
    pub fail_count: usize,
    pub skip_count: usize,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub additional_data: ActionData,

    /// Items the action succeeded on; undo targets these.
    #[serde(default)]
    pub item_ids: Vec<ItemId>,

    /// Set when this entry was itself produced by an undo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undo_of: Option<String>,
}

impl HistoryEntry {
    /// Build an entry from a request and the outcomes it produced.
    pub fn from_run(request: &BulkRequest, result: &ExecutionResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            action_id: request.action.id.clone(),
            action_label: request.action.label.clone(),
            content_type: request.content_type,
            item_count: result.attempted(),
            success_count: result.successful.len(),
            fail_count: result.failed.len(),
            skip_count: result.skipped.len(),
            timestamp: Utc::now(),
            additional_data: request.additional_data.clone(),
            item_ids: result.successful_ids(),
            undo_of: None,
        }
    }

    pub fn with_undo_of(mut self, entry_id: impl Into<String>) -> Self {
        self.undo_of = Some(entry_id.into());
        self
    }
}

/// Per-action totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStats {
    pub count: usize,
    pub items_processed: usize,
    pub successes: usize,
    pub failures: usize,
}

/// Totals across the whole history log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_operations: usize,
    pub total_items: usize,
    pub total_successes: usize,
    pub total_failures: usize,
    pub total_skipped: usize,
    pub by_action: BTreeMap<String, ActionStats>,
}

impl HistoryStats {
    /// Fold a sequence of entries into totals.
    pub fn fold<'a>(entries: impl IntoIterator<Item = &'a HistoryEntry>) -> Self {
        entries.into_iter().fold(Self::default(), |mut stats, entry| {
            stats.total_operations += 1;
            stats.total_items += entry.item_count;
            stats.total_successes += entry.success_count;
            stats.total_failures += entry.fail_count;
            stats.total_skipped += entry.skip_count;

            let action = stats.by_action.entry(entry.action_id.clone()).or_default();
            action.count += 1;
            action.items_processed += entry.item_count;
            action.successes += entry.success_count;
            action.failures += entry.fail_count;
            stats
        })
    }

    /// Share of processed items that succeeded, 0.0 when empty.
    pub fn success_rate(&self) -> f64 {
        if self.total_items == 0 {
            return 0.0;
        }
        self.total_successes as f64 / self.total_items as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionDescriptor;
    use crate::outcome::ItemOutcome;

    fn entry(action: &str, ok: usize, failed: usize) -> HistoryEntry {
        let request = BulkRequest::new(
            ContentType::BlogPost,
            ActionDescriptor::new(action, action),
            Vec::new(),
        );
        let mut result = ExecutionResult::default();
        for i in 0..ok {
            result
                .successful
                .push(ItemOutcome::succeeded(ItemId::Number(i as i64), serde_json::Value::Null));
        }
        for i in 0..failed {
            result.failed.push(ItemOutcome::failed(ItemId::Number(100 + i as i64), "err"));
        }
        HistoryEntry::from_run(&request, &result)
    }

    #[test]
    fn test_from_run_counts() {
        let e = entry("publish", 23, 2);
        assert_eq!(e.item_count, 25);
        assert_eq!(e.success_count, 23);
        assert_eq!(e.fail_count, 2);
        assert_eq!(e.item_ids.len(), 23);
        assert!(e.undo_of.is_none());
    }

    #[test]
    fn test_fold_by_action() {
        let entries = vec![entry("publish", 3, 1), entry("delete", 2, 0), entry("publish", 1, 1)];
        let stats = HistoryStats::fold(&entries);

        assert_eq!(stats.total_operations, 3);
        assert_eq!(stats.total_items, 8);
        assert_eq!(stats.total_successes, 6);
        assert_eq!(stats.total_failures, 2);

        let publish = &stats.by_action["publish"];
        assert_eq!(publish.count, 2);
        assert_eq!(publish.items_processed, 6);
        assert_eq!(publish.successes, 4);
        assert_eq!(publish.failures, 2);
        assert_eq!(stats.success_rate(), 0.75);
    }

    #[test]
    fn test_entry_round_trips_through_json() {
        let e = entry("archive", 1, 0).with_undo_of("abc");
        let json = serde_json::to_string(&e).unwrap();
        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
