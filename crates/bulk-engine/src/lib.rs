//! Bulk action engine for CMS content.
//!
//! This crate provides:
//! - The per-content-type action catalog
//! - Multi-item selection with persistence
//! - Pre-flight validation of bulk requests
//! - The batched executor with progress, cancellation and timeouts
//! - Bounded action history with undo

pub mod applier;
pub mod catalog;
pub mod engine;
pub mod history;
pub mod selection;
pub mod store;
pub mod validator;

// Re-export commonly used types
pub use applier::{ApplyCall, ItemApplier};
pub use catalog::ActionCatalog;
pub use engine::{BulkEngine, ObservableProgress};
pub use history::ActionHistory;
pub use selection::{SelectionSet, Toggle};
pub use store::{FileStore, KeyValueStore, MemoryStore, ScopedStore};
pub use validator::{validate, ValidationReport};

// Re-export bulk_core types for convenience
pub use bulk_core::{
    ActionData, ActionDescriptor, ApplyError, BulkError, BulkRequest, ContentType,
    EngineConfig, ExecutionResult, HistoryEntry, HistoryStats, ItemId, ItemOutcome,
    ProgressState, RunStatus,
};
