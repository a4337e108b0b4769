//! Command-line front-end for the bulk content action engine.
//!
//! Selections and history persist between invocations in a file store, so an
//! operator can `select`, `run`, inspect `history` and `undo` across separate
//! commands. `run` and `undo` go through a simulated backend.

pub mod cli;
pub mod commands;
pub mod error;
pub mod report;
pub mod simulated;

pub use cli::{Cli, Command};
pub use commands::{execute, Context};
pub use error::{CliError, CliResult};
pub use simulated::SimulatedApplier;
