//! Error types for the bulk action engine.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::item::ContentType;
use crate::outcome::ExecutionResult;

/// Engine errors - surfaced to the caller of `execute`.
///
/// Per-item failures never appear here; they are recorded in
/// `ExecutionResult::failed` and the run continues.
#[derive(Debug, Error)]
pub enum BulkError {
    /// Pre-flight checks failed; nothing was dispatched.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The run was aborted outside per-item handling.
    #[error("Bulk run failed: {message}")]
    Run {
        message: String,
        partial: ExecutionResult,
    },

    /// The operator cancelled the run.
    #[error("Bulk run cancelled after {} items", .partial.attempted())]
    Cancelled { partial: ExecutionResult },

    /// Another run is already in flight on this engine.
    #[error("A bulk run is already in progress")]
    Busy,

    /// Undo is turned off in configuration.
    #[error("Undo is disabled")]
    UndoDisabled,

    /// History is empty.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Request built for a different content type than the engine serves.
    #[error("Request targets {request} but this engine runs {engine} actions")]
    ContentTypeMismatch {
        engine: ContentType,
        request: ContentType,
    },

    /// Action id not registered for the content type.
    #[error("Unknown action '{action}' for {content_type}")]
    UnknownAction {
        content_type: String,
        action: String,
    },
}

impl BulkError {
    /// Outcomes gathered before the run stopped, if any.
    pub fn partial(&self) -> Option<&ExecutionResult> {
        match self {
            Self::Run { partial, .. } | Self::Cancelled { partial } => Some(partial),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Per-item errors returned by an applier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplyError {
    /// Backend answered with a non-success status.
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    /// Request never got a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backend declined the item (e.g. already in the requested state).
    #[error("Not applicable: {0}")]
    NotApplicable(String),

    /// Per-item call exceeded its time budget.
    #[error("Timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Call observed the run's cancellation signal.
    #[error("Cancelled")]
    Cancelled,
}

/// Key-value store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error at {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    /// Stored value could not be (de)serialized.
    #[error("Serialization error for key '{key}': {message}")]
    Serialization { key: String, message: String },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config directory found.
    #[error("Config directory not found")]
    NoConfigDir,

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A setting is out of range.
    #[error("Invalid setting '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

/// Errors parsing user-facing identifiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown content type '{0}' (expected blog_post, sermon, event or user)")]
    UnknownContentType(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::ItemOutcome;

    #[test]
    fn test_validation_display_joins_errors() {
        let err = BulkError::Validation(vec![
            "No items selected".to_string(),
            "Category is required".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: No items selected; Category is required"
        );
        assert!(err.partial().is_none());
    }

    #[test]
    fn test_cancelled_keeps_partial() {
        let mut partial = ExecutionResult::default();
        partial
            .successful
            .push(ItemOutcome::succeeded(1.into(), serde_json::Value::Null));

        let err = BulkError::Cancelled { partial };
        assert!(err.is_cancelled());
        assert_eq!(err.partial().map(|p| p.attempted()), Some(1));
        assert_eq!(err.to_string(), "Bulk run cancelled after 1 items");
    }

    #[test]
    fn test_apply_error_display() {
        let err = ApplyError::Status {
            code: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: unavailable");
    }
}
