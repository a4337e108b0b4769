//! Simulated backend for operator dry runs.
//!
//! Every call is logged and succeeds, except for ids the operator asked to
//! fail. Useful for exercising batching and history without a CMS.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use bulk_core::{ApplyError, ItemId};
use bulk_engine::{ApplyCall, ItemApplier};

/// In-process stand-in for the CMS backend.
#[derive(Debug, Default)]
pub struct SimulatedApplier {
    failures: HashSet<ItemId>,
    latency: Duration,
}

impl SimulatedApplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject these items with an HTTP 500.
    pub fn with_failures(mut self, ids: impl IntoIterator<Item = ItemId>) -> Self {
        self.failures.extend(ids);
        self
    }

    /// Pretend each request takes this long.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl ItemApplier for SimulatedApplier {
    async fn apply(&self, call: ApplyCall) -> Result<serde_json::Value, ApplyError> {
        tracing::info!(
            "POST /{}/{}/{} {:?}",
            call.content_type,
            call.item_id,
            call.action_id,
            call.data
        );

        if !self.latency.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(self.latency) => {}
                _ = call.cancel.cancelled() => return Err(ApplyError::Cancelled),
            }
        }

        if self.failures.contains(&call.item_id) {
            return Err(ApplyError::Status {
                code: 500,
                message: format!("simulated failure for {}", call.item_id),
            });
        }

        Ok(json!({
            "id": call.item_id,
            "action": call.action_id,
            "status": "ok",
        }))
    }
}
