//! The per-item "apply action" call.
//!
//! The engine does not know how an action reaches the backend. It hands each
//! item to an `ItemApplier`, which usually wraps one HTTP request.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use bulk_core::{ActionData, ApplyError, ContentType, ItemId};

/// Everything an applier needs for one item.
#[derive(Debug, Clone)]
pub struct ApplyCall {
    pub content_type: ContentType,
    pub item_id: ItemId,
    pub action_id: String,
    pub data: ActionData,

    /// The run's cancellation signal. The engine only checks it between
    /// batches; appliers may watch it to abort slow requests early.
    pub cancel: CancellationToken,
}

/// Applies one action to one item.
///
/// Implementations must be safe to call concurrently: every item in a batch
/// is dispatched at once.
#[async_trait]
pub trait ItemApplier: Send + Sync {
    /// Apply the action. `Ok` carries whatever the backend returned.
    async fn apply(&self, call: ApplyCall) -> Result<serde_json::Value, ApplyError>;
}
