//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use bulk_core::ContentType;

#[derive(Debug, Parser)]
#[command(name = "bulk", version, about = "Run bulk actions against CMS content")]
pub struct Cli {
    /// Config file (defaults to <config dir>/bulk/config.toml)
    #[arg(long, global = true, env = "BULK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding persisted selections and history
    #[arg(long, global = true, env = "BULK_STORE")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the actions available for a content type
    Actions { content_type: ContentType },

    /// Replace the selection with the given ids
    Select {
        content_type: ContentType,
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Add or remove one id
    Toggle { content_type: ContentType, id: String },

    /// Clear the selection
    Deselect { content_type: ContentType },

    /// Show the selection
    Selection { content_type: ContentType },

    /// Run an action against the selection or explicit ids
    Run(RunArgs),

    /// Show recent bulk runs, newest first
    History { content_type: ContentType },

    /// Show totals across the history
    Stats { content_type: ContentType },

    /// Reverse the most recent run
    Undo(UndoArgs),

    /// Forget all history for a content type
    ClearHistory { content_type: ContentType },
}

/// Options for the simulated backend.
#[derive(Debug, Clone, Default, Args)]
pub struct SimulationArgs {
    /// Ids the simulated backend should reject
    #[arg(long, value_delimiter = ',')]
    pub fail: Vec<String>,

    /// Simulated per-request latency
    #[arg(long, default_value_t = 0)]
    pub latency_ms: u64,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    pub content_type: ContentType,

    /// Action id, e.g. `publish`
    pub action: String,

    /// Target ids; the persisted selection is used when omitted
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,

    /// Action parameter as key=value; JSON values are parsed
    #[arg(long = "data")]
    pub data: Vec<String>,

    #[command(flatten)]
    pub simulation: SimulationArgs,
}

#[derive(Debug, Args)]
pub struct UndoArgs {
    pub content_type: ContentType,

    #[command(flatten)]
    pub simulation: SimulationArgs,
}
