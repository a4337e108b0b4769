//! One batch: dispatch every item concurrently, wait for all, classify.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;

use bulk_core::{ActionData, ApplyError, ContentType, ExecutionResult, ItemId, ItemOutcome};

use crate::applier::{ApplyCall, ItemApplier};

/// Per-run inputs shared by every batch.
pub(super) struct BatchContext {
    pub applier: Arc<dyn ItemApplier>,
    pub content_type: ContentType,
    pub action_id: String,
    pub data: ActionData,
    pub item_timeout: Duration,
    pub cancel: CancellationToken,
}

/// What one batch produced.
pub(super) struct BatchOutcome {
    pub result: ExecutionResult,

    /// Set when an item's task died before it could be classified.
    pub fault: Option<String>,
}

/// Run one batch.
///
/// Every item gets its own task; one item's failure never aborts its
/// siblings. Returns only after every task has settled. Dropping the future
/// aborts the tasks still in flight.
pub(super) async fn run_batch(ctx: &BatchContext, batch: &[ItemId]) -> BatchOutcome {
    let handles: Vec<_> = batch
        .iter()
        .map(|item_id| {
            let applier = Arc::clone(&ctx.applier);
            let timeout = ctx.item_timeout;
            let call = ApplyCall {
                content_type: ctx.content_type,
                item_id: item_id.clone(),
                action_id: ctx.action_id.clone(),
                data: ctx.data.clone(),
                cancel: ctx.cancel.clone(),
            };

            AbortOnDropHandle::new(tokio::spawn(async move {
                match tokio::time::timeout(timeout, applier.apply(call)).await {
                    Ok(result) => result,
                    Err(_) => Err(ApplyError::Timeout { duration: timeout }),
                }
            }))
        })
        .collect();

    let settled = futures::future::join_all(handles).await;

    let mut result = ExecutionResult::default();
    let mut fault = None;

    for (item_id, joined) in batch.iter().cloned().zip(settled) {
        match joined {
            Ok(Ok(data)) => result.successful.push(ItemOutcome::succeeded(item_id, data)),
            Ok(Err(ApplyError::NotApplicable(reason))) => {
                tracing::debug!("Skipped {}: {}", item_id, reason);
                result.skipped.push(ItemOutcome::failed(item_id, reason));
            }
            Ok(Err(e)) => {
                tracing::debug!("Item {} failed: {}", item_id, e);
                result.failed.push(ItemOutcome::failed(item_id, e.to_string()));
            }
            Err(join_error) => {
                tracing::error!("Task for item {} did not settle: {}", item_id, join_error);
                fault.get_or_insert_with(|| {
                    format!("Task for item {} did not settle: {}", item_id, join_error)
                });
            }
        }
    }

    BatchOutcome { result, fault }
}
