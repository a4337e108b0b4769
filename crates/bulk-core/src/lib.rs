//! Core types for the bulk content action engine.
//!
//! This crate contains shared data structures used across all bulk crates:
//! - Item identifiers and content types
//! - Action descriptors, requirements and requests
//! - Per-item outcomes, run results and progress
//! - History entries and statistics
//! - Configuration types
//! - Error types

mod action;
mod config;
mod error;
mod history;
mod item;
mod outcome;

pub use action::{ActionData, ActionDescriptor, BulkRequest, Requirement};
pub use config::{config_dir, config_path, data_dir, AppConfig, EngineConfig, StorageConfig};
pub use error::{ApplyError, BulkError, ConfigError, ParseError, StoreError};
pub use history::{ActionStats, HistoryEntry, HistoryStats};
pub use item::{ContentType, ItemId};
pub use outcome::{ExecutionResult, ItemOutcome, ProgressState, RunStatus};
