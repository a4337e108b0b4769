//! Observable run progress with automatic change notifications.
//!
//! Mutation = notification. Every method that changes the progress state also
//! broadcasts it, so subscribers (progress bars, log lines) can never miss a
//! transition.

use tokio::sync::watch;

use bulk_core::{ProgressState, RunStatus};

// =============================================================================
// ObservableProgress
// =============================================================================

/// Progress state that broadcasts every change.
///
/// Status transitions always broadcast. Per-batch `current` updates are only
/// broadcast when progress tracking is enabled; the final count is always
/// published with the terminal status.
///
/// ## Usage
///
/// ```ignore
/// let progress = ObservableProgress::new(true);
/// let rx = progress.subscribe();
///
/// progress.start(25);
/// progress.advance(10);
/// assert_eq!(rx.borrow().current, 10);
/// ```
pub struct ObservableProgress {
    tx: watch::Sender<ProgressState>,
    rx: watch::Receiver<ProgressState>,
    track_batches: bool,
}

impl ObservableProgress {
    /// Create idle progress.
    pub fn new(track_batches: bool) -> Self {
        let (tx, rx) = watch::channel(ProgressState::default());
        Self {
            tx,
            rx,
            track_batches,
        }
    }

    // =========================================================================
    // Mutation Methods (all broadcast)
    // =========================================================================

    /// Enter the validating state for a run of `total` items.
    pub fn begin_validation(&self, total: usize) {
        self.tx.send_replace(ProgressState {
            current: 0,
            total,
            status: RunStatus::Validating,
            error: None,
        });
    }

    /// Enter the processing state.
    pub fn start(&self, total: usize) {
        self.tx.send_replace(ProgressState {
            current: 0,
            total,
            status: RunStatus::Processing,
            error: None,
        });
    }

    /// Record items attempted so far. Never moves backwards.
    pub fn advance(&self, current: usize) {
        if !self.track_batches {
            return;
        }
        self.tx.send_if_modified(|state| {
            if current > state.current {
                state.current = current;
                true
            } else {
                false
            }
        });
    }

    /// Enter a terminal state.
    pub fn finish(&self, status: RunStatus, current: usize, error: Option<String>) {
        self.tx.send_modify(|state| {
            state.current = state.current.max(current);
            state.status = status;
            state.error = error;
        });
    }

    /// Return to idle.
    pub fn reset(&self) {
        self.tx.send_replace(ProgressState::default());
    }

    // =========================================================================
    // Read Methods
    // =========================================================================

    /// Snapshot of the current state.
    pub fn get(&self) -> ProgressState {
        self.rx.borrow().clone()
    }

    pub fn status(&self) -> RunStatus {
        self.rx.borrow().status
    }

    /// Subscribe to progress changes.
    ///
    /// The receiver sees the current state immediately and all future changes.
    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.rx.clone()
    }
}

impl Default for ObservableProgress {
    fn default() -> Self {
        Self::new(true)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_broadcasts() {
        let progress = ObservableProgress::new(true);
        let rx = progress.subscribe();
        assert_eq!(rx.borrow().status, RunStatus::Idle);

        progress.begin_validation(25);
        assert_eq!(rx.borrow().status, RunStatus::Validating);
        assert_eq!(rx.borrow().total, 25);

        progress.start(25);
        progress.advance(10);
        assert_eq!(rx.borrow().status, RunStatus::Processing);
        assert_eq!(rx.borrow().current, 10);

        progress.finish(RunStatus::Completed, 25, None);
        assert_eq!(progress.get().current, 25);
        assert_eq!(progress.status(), RunStatus::Completed);
    }

    #[test]
    fn test_advance_is_monotonic() {
        let progress = ObservableProgress::new(true);
        progress.start(30);
        progress.advance(20);
        progress.advance(10);
        assert_eq!(progress.get().current, 20);
    }

    #[test]
    fn test_untracked_only_publishes_final_count() {
        let progress = ObservableProgress::new(false);
        let rx = progress.subscribe();

        progress.start(20);
        progress.advance(10);
        assert_eq!(rx.borrow().current, 0);

        progress.finish(RunStatus::Completed, 20, None);
        assert_eq!(rx.borrow().current, 20);
    }

    #[test]
    fn test_finish_with_error_then_reset() {
        let progress = ObservableProgress::new(true);
        progress.begin_validation(0);
        progress.finish(RunStatus::Failed, 0, Some("No items selected".to_string()));

        let state = progress.get();
        assert_eq!(state.status, RunStatus::Failed);
        assert_eq!(state.error.as_deref(), Some("No items selected"));

        progress.reset();
        assert_eq!(progress.get(), ProgressState::default());
    }

    #[tokio::test]
    async fn test_subscriber_wakes_on_change() {
        let progress = ObservableProgress::new(true);
        let mut rx = progress.subscribe();
        rx.borrow_and_update();

        progress.start(5);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().total, 5);
    }
}
