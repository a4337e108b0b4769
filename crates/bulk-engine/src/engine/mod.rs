//! Bulk Engine
//!
//! The `BulkEngine` owns the selection, history and progress for one content
//! type and runs bulk actions through the batch executor.
//!
//! ## Run Flow
//!
//! ```text
//! execute(request)
//!        │
//!        ▼
//! ┌──────────────┐   invalid
//! │  Validating  │──────────────► Failed (no calls issued)
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │  Processing  │◄─────────────────────────┐
//! └──────┬───────┘                          │
//!        ▼                                  │
//! cancelled? ── yes ──► Cancelled           │
//!        │ no                               │
//!        ▼                                  │
//! dispatch batch (all items concurrently)   │
//! wait for every item to settle             │
//!        │                                  │
//!        ▼                                  │
//! task died? ── yes ──► Failed              │
//!        │ no                               │
//!        ▼                                  │
//! more batches? ── yes ── delay ────────────┘
//!        │ no
//!        ▼
//!    Completed
//! ```
//!
//! Every exit after validation records a history entry (when anything was
//! attempted) and clears the selection when at least one item succeeded.
//! That includes a run whose future is dropped mid-flight: outcomes are
//! gathered on the engine after each batch, and the run guard settles them.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use bulk_core::{
    ActionData, ActionDescriptor, BulkError, BulkRequest, ContentType, EngineConfig,
    ExecutionResult, HistoryEntry, HistoryStats, ItemId, ProgressState, RunStatus,
};

use crate::applier::ItemApplier;
use crate::catalog::ActionCatalog;
use crate::history::ActionHistory;
use crate::selection::SelectionSet;
use crate::store::{KeyValueStore, ScopedStore};
use crate::validator::{self, ValidationReport};

mod batch;
mod observable_progress;
mod undo;

pub use observable_progress::ObservableProgress;

use batch::{BatchContext, BatchOutcome};

// =============================================================================
// Bulk Engine
// =============================================================================

/// Runs bulk actions for one content type.
///
/// Each content type gets an independent engine; engines share nothing
/// mutable except the injected store.
pub struct BulkEngine {
    content_type: ContentType,
    config: EngineConfig,
    catalog: Arc<ActionCatalog>,
    applier: Arc<dyn ItemApplier>,
    selection: SelectionSet,
    history: ActionHistory,
    progress: ObservableProgress,

    /// Cancellation token of the in-flight run, if any.
    active: Mutex<Option<CancellationToken>>,

    /// Outcomes of the in-flight run, updated after every batch.
    ledger: Mutex<Option<RunLedger>>,
}

/// What the in-flight run has done so far.
struct RunLedger {
    request: BulkRequest,
    result: ExecutionResult,
    undo_of: Option<String>,
}

/// Why the batch loop stopped early.
enum Halt {
    Cancelled,
    Fault(String),
}

impl BulkEngine {
    /// Create an engine, restoring selection and history from `store`.
    pub fn new(
        content_type: ContentType,
        config: EngineConfig,
        catalog: Arc<ActionCatalog>,
        applier: Arc<dyn ItemApplier>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let scoped = ScopedStore::new(store, content_type);
        let selection = SelectionSet::load(config.max_selection, scoped.clone());
        let history = ActionHistory::load(config.history_limit, scoped);
        let progress = ObservableProgress::new(config.enable_progress_tracking);

        Self {
            content_type,
            config,
            catalog,
            applier,
            selection,
            history,
            progress,
            active: Mutex::new(None),
            ledger: Mutex::new(None),
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    /// Actions the catalog offers for this engine's content type.
    pub fn available_actions(&self) -> Vec<ActionDescriptor> {
        self.catalog.list(self.content_type)
    }

    /// Look up an action by id.
    pub fn action(&self, id: &str) -> Option<ActionDescriptor> {
        self.catalog.get(self.content_type, id)
    }

    // =========================================================================
    // Progress
    // =========================================================================

    /// Subscribe to progress changes.
    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.progress.subscribe()
    }

    /// Snapshot of the current progress.
    pub fn progress(&self) -> ProgressState {
        self.progress.get()
    }

    pub fn is_running(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Whether `execute_selected` has something to work on.
    pub fn can_execute(&self) -> bool {
        !self.selection.is_empty() && !self.is_running()
    }

    /// Return progress to idle. Ignored while a run is in flight.
    pub fn reset(&self) {
        if !self.is_running() {
            self.progress.reset();
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Pre-flight check against this engine's selection ceiling.
    pub fn validate(
        &self,
        action: Option<&ActionDescriptor>,
        target_ids: &[ItemId],
        data: &ActionData,
    ) -> ValidationReport {
        validator::validate(action, target_ids, data, self.config.max_selection)
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Run a bulk action with a fresh cancellation token.
    ///
    /// Use `cancel()` to stop it between batches.
    pub async fn execute(&self, request: BulkRequest) -> Result<ExecutionResult, BulkError> {
        self.execute_with(request, CancellationToken::new()).await
    }

    /// Run a bulk action under a caller-supplied cancellation token.
    ///
    /// The token is checked before each batch; items already dispatched are
    /// allowed to settle.
    pub async fn execute_with(
        &self,
        request: BulkRequest,
        cancel: CancellationToken,
    ) -> Result<ExecutionResult, BulkError> {
        if request.content_type != self.content_type {
            return Err(BulkError::ContentTypeMismatch {
                engine: self.content_type,
                request: request.content_type,
            });
        }
        let _guard = self.begin_run(cancel.clone())?;
        self.run(request, &cancel, None).await
    }

    /// Run a catalog action against the current selection.
    pub async fn execute_selected(
        &self,
        action_id: &str,
        data: ActionData,
    ) -> Result<ExecutionResult, BulkError> {
        let action = self.action(action_id).ok_or_else(|| BulkError::UnknownAction {
            content_type: self.content_type.to_string(),
            action: action_id.to_string(),
        })?;
        let request =
            BulkRequest::new(self.content_type, action, self.selection.ids()).with_data(data);
        self.execute(request).await
    }

    /// Signal the in-flight run to stop at the next batch boundary.
    ///
    /// Returns false when nothing is running.
    pub fn cancel(&self) -> bool {
        match self.active.lock().as_ref() {
            Some(token) => {
                tracing::info!("Cancelling {} bulk run", self.content_type);
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Replay the most recent history entry as a compensating action.
    ///
    /// Targets the items the original run succeeded on, with the original
    /// `additional_data`. The backend decides what the reverse action means.
    pub async fn undo_last_action(&self) -> Result<ExecutionResult, BulkError> {
        if !self.config.enable_undo {
            return Err(BulkError::UndoDisabled);
        }
        let entry = self.history.latest().ok_or(BulkError::NothingToUndo)?;
        if entry.item_ids.is_empty() {
            return Err(BulkError::NothingToUndo);
        }

        let request = undo::reverse_request(&entry, &self.catalog);
        tracing::info!(
            "Undoing '{}' on {} items with '{}'",
            entry.action_id,
            request.target_ids.len(),
            request.action.id
        );

        let cancel = CancellationToken::new();
        let _guard = self.begin_run(cancel.clone())?;
        self.run(request, &cancel, Some(entry.id)).await
    }

    // =========================================================================
    // History
    // =========================================================================

    pub fn stats(&self) -> HistoryStats {
        self.history.stats()
    }

    pub fn clear_history(&self) {
        self.history.clear();
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Claim the engine for one run.
    fn begin_run(&self, cancel: CancellationToken) -> Result<RunGuard<'_>, BulkError> {
        let mut active = self.active.lock();
        if active.is_some() {
            return Err(BulkError::Busy);
        }
        *active = Some(cancel);
        Ok(RunGuard { engine: self })
    }

    /// The batch loop. Caller holds a `RunGuard`.
    async fn run(
        &self,
        request: BulkRequest,
        cancel: &CancellationToken,
        undo_of: Option<String>,
    ) -> Result<ExecutionResult, BulkError> {
        let total = request.target_ids.len();
        self.progress.begin_validation(total);

        if self.config.enable_validation {
            let report = self.validate(
                Some(&request.action),
                &request.target_ids,
                &request.additional_data,
            );
            if !report.is_ok() {
                let errors = report.into_errors();
                tracing::warn!(
                    "Rejected '{}' on {} {} items: {}",
                    request.action.id,
                    total,
                    self.content_type,
                    errors.join("; ")
                );
                self.progress
                    .finish(RunStatus::Failed, 0, Some(errors.join("; ")));
                return Err(BulkError::Validation(errors));
            }
        }

        tracing::info!(
            "Running '{}' on {} {} items",
            request.action.id,
            total,
            self.content_type
        );
        self.progress.start(total);

        let ctx = BatchContext {
            applier: Arc::clone(&self.applier),
            content_type: self.content_type,
            action_id: request.action.id.clone(),
            data: request.additional_data.clone(),
            item_timeout: self.config.item_timeout(),
            cancel: cancel.clone(),
        };
        let action_id = request.action.id.clone();
        let targets = request.target_ids.clone();
        let batches: Vec<&[ItemId]> = targets.chunks(self.config.batch_size.max(1)).collect();
        let delay = self.config.batch_delay();

        *self.ledger.lock() = Some(RunLedger {
            request,
            result: ExecutionResult::default(),
            undo_of,
        });

        let mut attempted = 0;
        let mut halt = None;

        for (index, batch) in batches.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!("Run cancelled before batch {}/{}", index + 1, batches.len());
                halt = Some(Halt::Cancelled);
                break;
            }

            tracing::debug!(
                "Dispatching batch {}/{} ({} items)",
                index + 1,
                batches.len(),
                batch.len()
            );
            let BatchOutcome {
                result: batch_result,
                fault,
            } = batch::run_batch(&ctx, batch).await;

            attempted += batch.len();
            if let Some(ledger) = self.ledger.lock().as_mut() {
                ledger.result.merge(batch_result);
            }
            self.progress.advance(attempted);

            if let Some(message) = fault {
                halt = Some(Halt::Fault(message));
                break;
            }

            let is_last = index + 1 == batches.len();
            if !is_last && !delay.is_zero() {
                // Wakes early on cancel; the next boundary check reports it
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => {}
                }
            }
        }

        let result = self.settle().unwrap_or_default();

        match halt {
            None => {
                tracing::info!(
                    "Finished '{}': {} succeeded, {} failed, {} skipped",
                    action_id,
                    result.successful.len(),
                    result.failed.len(),
                    result.skipped.len()
                );
                self.progress.finish(RunStatus::Completed, attempted, None);
                Ok(result)
            }
            Some(Halt::Cancelled) => {
                tracing::info!(
                    "Cancelled '{}' after {} of {} items",
                    action_id,
                    attempted,
                    total
                );
                self.progress.finish(RunStatus::Cancelled, attempted, None);
                Err(BulkError::Cancelled { partial: result })
            }
            Some(Halt::Fault(message)) => {
                tracing::error!("Bulk run '{}' failed: {}", action_id, message);
                self.progress
                    .finish(RunStatus::Failed, attempted, Some(message.clone()));
                Err(BulkError::Run {
                    message,
                    partial: result,
                })
            }
        }
    }

    /// Close out the in-flight run: record history when anything was
    /// attempted and clear the selection when anything succeeded.
    ///
    /// Returns `None` when there is no run to settle.
    fn settle(&self) -> Option<ExecutionResult> {
        let ledger = self.ledger.lock().take()?;

        if ledger.result.attempted() > 0 {
            let mut entry = HistoryEntry::from_run(&ledger.request, &ledger.result);
            if let Some(original) = ledger.undo_of {
                entry = entry.with_undo_of(original);
            }
            self.history.record(entry);
        }
        if ledger.result.has_successes() {
            self.selection.deselect_all();
        }
        Some(ledger.result)
    }
}

// =============================================================================
// Run Guard
// =============================================================================

/// Releases the engine when a run ends, including when its future is dropped.
struct RunGuard<'a> {
    engine: &'a BulkEngine,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let engine = self.engine;
        if let Some(result) = engine.settle() {
            let attempted = result.attempted();
            tracing::warn!("Bulk run dropped after {} items", attempted);
            engine.progress.finish(
                RunStatus::Cancelled,
                attempted,
                Some("Run dropped before completion".to_string()),
            );
        } else if engine.progress.status().is_active() {
            tracing::warn!("Bulk run dropped before completion");
            engine.progress.finish(
                RunStatus::Cancelled,
                0,
                Some("Run dropped before completion".to_string()),
            );
        }
        engine.active.lock().take();
    }
}

// =============================================================================
// Tests
// =============================================================================
