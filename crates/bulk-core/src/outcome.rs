//! Per-item outcomes, aggregated results and run progress.

use serde::{Deserialize, Serialize};

use crate::item::ItemId;

/// Result of applying the action to one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub item_id: ItemId,

    pub success: bool,

    /// Data returned by the backend on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Failure or skip reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemOutcome {
    pub fn succeeded(item_id: ItemId, data: serde_json::Value) -> Self {
        Self {
            item_id,
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(item_id: ItemId, error: impl Into<String>) -> Self {
        Self {
            item_id,
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Aggregate of every outcome produced by one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub successful: Vec<ItemOutcome>,
    pub failed: Vec<ItemOutcome>,
    /// Items the backend reported as not applicable.
    pub skipped: Vec<ItemOutcome>,
}

impl ExecutionResult {
    /// Number of items that produced an outcome.
    pub fn attempted(&self) -> usize {
        self.successful.len() + self.failed.len() + self.skipped.len()
    }

    pub fn has_successes(&self) -> bool {
        !self.successful.is_empty()
    }

    /// Ids of the items that succeeded, in target order.
    pub fn successful_ids(&self) -> Vec<ItemId> {
        self.successful.iter().map(|o| o.item_id.clone()).collect()
    }

    /// Absorb another partial result.
    pub fn merge(&mut self, other: ExecutionResult) {
        self.successful.extend(other.successful);
        self.failed.extend(other.failed);
        self.skipped.extend(other.skipped);
    }
}

/// Lifecycle status of the executor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Idle,
    Validating,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    /// Terminal states accept a new run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Validating | Self::Processing)
    }
}

/// Live progress of the current (or last) run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Items attempted so far across all batches.
    pub current: usize,
    pub total: usize,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressState {
    /// Completion percentage, 0 when nothing is queued.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.current.min(self.total) * 100) / self.total) as u8
    }
}
