//! Error type for the `bulk` binary.

use std::path::PathBuf;

use thiserror::Error;

use bulk_core::{BulkError, ConfigError, StoreError};

/// Anything that can stop a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Config file could not be read or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// State directory could not be opened
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The engine rejected or aborted the run
    #[error(transparent)]
    Bulk(#[from] BulkError),

    /// `--config` named a file that does not exist
    #[error("Config file not found: {0:?}")]
    ConfigNotFound(PathBuf),

    /// A `--data` pair was not `key=value`
    #[error("Invalid --data value '{0}' (expected key=value)")]
    InvalidData(String),
}

pub type CliResult<T> = Result<T, CliError>;
