//! Command execution.
//!
//! Every command builds a fresh engine over the persisted store, does its
//! work and returns the text to print.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bulk_core::{
    config_path, ActionData, AppConfig, BulkError, BulkRequest, ContentType, ExecutionResult,
    ItemId, RunStatus,
};
use bulk_engine::{ActionCatalog, BulkEngine, FileStore, ItemApplier, KeyValueStore};

use crate::cli::{Command, RunArgs, SimulationArgs, UndoArgs};
use crate::error::{CliError, CliResult};
use crate::report;
use crate::simulated::SimulatedApplier;

// =============================================================================
// Context
// =============================================================================

/// Shared state for one CLI invocation.
pub struct Context {
    config: AppConfig,
    store: Arc<dyn KeyValueStore>,
    catalog: Arc<ActionCatalog>,
}

impl Context {
    /// Load config and open the state directory.
    ///
    /// An explicit `--config` must exist. Without it, the platform config
    /// file is used when present. Without `--store`, the directory comes
    /// from `[storage] dir` or the platform data dir.
    pub fn load(config: Option<&Path>, store_dir: Option<PathBuf>) -> CliResult<Self> {
        if let Some(path) = config {
            if !path.is_file() {
                return Err(CliError::ConfigNotFound(path.to_path_buf()));
            }
        }
        let config = match config.map(Path::to_path_buf).or_else(config_path) {
            Some(path) => {
                tracing::debug!("Loading config from {:?}", path);
                AppConfig::load(&path)?
            }
            None => AppConfig::default(),
        };

        let dir = match store_dir {
            Some(dir) => dir,
            None => config.storage.resolve_dir()?,
        };
        let store = FileStore::open(dir)?;
        Ok(Self::new(config, Arc::new(store)))
    }

    pub fn new(config: AppConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            config,
            store,
            catalog: Arc::new(ActionCatalog::builtin()),
        }
    }

    fn engine(&self, content_type: ContentType, applier: Arc<dyn ItemApplier>) -> BulkEngine {
        BulkEngine::new(
            content_type,
            self.config.engine.clone(),
            Arc::clone(&self.catalog),
            applier,
            Arc::clone(&self.store),
        )
    }

    /// Engine for commands that never apply anything.
    fn idle_engine(&self, content_type: ContentType) -> BulkEngine {
        self.engine(content_type, Arc::new(SimulatedApplier::new()))
    }

    fn simulated_engine(&self, content_type: ContentType, sim: &SimulationArgs) -> BulkEngine {
        let applier = SimulatedApplier::new()
            .with_failures(sim.fail.iter().map(|id| ItemId::parse(id)))
            .with_latency(Duration::from_millis(sim.latency_ms));
        self.engine(content_type, Arc::new(applier))
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Execute one command and return its output.
pub async fn execute(ctx: &Context, command: Command) -> CliResult<String> {
    match command {
        Command::Actions { content_type } => {
            let engine = ctx.idle_engine(content_type);
            Ok(report::actions(content_type, &engine.available_actions()))
        }
        Command::Select { content_type, ids } => {
            let engine = ctx.idle_engine(content_type);
            let selection = engine.selection();
            let requested = ids.len();
            let kept = selection.select_all(ids.iter().map(|id| ItemId::parse(id)));
            if kept < requested {
                tracing::warn!(
                    "Kept {} of {} ids (duplicates dropped, limit {})",
                    kept,
                    requested,
                    selection.max_selection()
                );
            }
            Ok(report::selection(
                content_type,
                &selection.ids(),
                selection.max_selection(),
            ))
        }
        Command::Toggle { content_type, id } => {
            let engine = ctx.idle_engine(content_type);
            let selection = engine.selection();
            let id = ItemId::parse(&id);
            let outcome = selection.toggle(id.clone());
            Ok(report::toggle(
                &id,
                outcome,
                selection.len(),
                selection.max_selection(),
            ))
        }
        Command::Deselect { content_type } => {
            let engine = ctx.idle_engine(content_type);
            engine.selection().deselect_all();
            Ok(report::selection(
                content_type,
                &[],
                engine.selection().max_selection(),
            ))
        }
        Command::Selection { content_type } => {
            let engine = ctx.idle_engine(content_type);
            let selection = engine.selection();
            Ok(report::selection(
                content_type,
                &selection.ids(),
                selection.max_selection(),
            ))
        }
        Command::Run(args) => run(ctx, args).await,
        Command::History { content_type } => {
            let engine = ctx.idle_engine(content_type);
            Ok(report::history(&engine.history().entries()))
        }
        Command::Stats { content_type } => {
            let engine = ctx.idle_engine(content_type);
            Ok(report::stats(&engine.stats()))
        }
        Command::Undo(args) => undo(ctx, args).await,
        Command::ClearHistory { content_type } => {
            let engine = ctx.idle_engine(content_type);
            let cleared = engine.history().len();
            engine.clear_history();
            Ok(format!("Cleared {} history entries", cleared))
        }
    }
}

async fn run(ctx: &Context, args: RunArgs) -> CliResult<String> {
    let engine = ctx.simulated_engine(args.content_type, &args.simulation);
    let data = parse_data(&args.data)?;

    let outcome = if args.ids.is_empty() {
        supervise(&engine, engine.execute_selected(&args.action, data)).await
    } else {
        let action = engine
            .action(&args.action)
            .ok_or_else(|| BulkError::UnknownAction {
                content_type: args.content_type.to_string(),
                action: args.action.clone(),
            })?;
        let targets = args.ids.iter().map(|id| ItemId::parse(id)).collect();
        let request = BulkRequest::new(args.content_type, action, targets).with_data(data);
        supervise(&engine, engine.execute(request)).await
    };

    render_outcome(outcome)
}

async fn undo(ctx: &Context, args: UndoArgs) -> CliResult<String> {
    let engine = ctx.simulated_engine(args.content_type, &args.simulation);
    let outcome = supervise(&engine, engine.undo_last_action()).await;
    render_outcome(outcome)
}

/// Drive a run, logging progress and cancelling on Ctrl+C.
async fn supervise(
    engine: &BulkEngine,
    run: impl std::future::Future<Output = Result<ExecutionResult, BulkError>>,
) -> Result<ExecutionResult, BulkError> {
    let mut rx = engine.subscribe();
    let progress = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if state.status == RunStatus::Processing && state.current > 0 {
                tracing::info!(
                    "Progress: {}/{} ({}%)",
                    state.current,
                    state.total,
                    state.percent()
                );
            }
            if state.status.is_terminal() {
                break;
            }
        }
    });

    tokio::pin!(run);
    let outcome = tokio::select! {
        outcome = &mut run => outcome,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => {
                    tracing::info!("Received Ctrl+C, stopping after the current batch");
                    engine.cancel();
                }
                Err(e) => tracing::warn!("Failed to install Ctrl+C handler: {}", e),
            }
            run.await
        }
    };

    progress.abort();
    outcome
}

/// Partial results are still output; only usage errors fail the command.
fn render_outcome(outcome: Result<ExecutionResult, BulkError>) -> CliResult<String> {
    match outcome {
        Ok(result) => Ok(report::result(&result)),
        Err(e) => match e.partial() {
            Some(partial) => Ok(format!("{}\n{}", e, report::result(partial))),
            None => Err(e.into()),
        },
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse `key=value` pairs. Values that parse as JSON keep their type;
/// anything else is a string.
pub fn parse_data(pairs: &[String]) -> CliResult<ActionData> {
    let mut data = ActionData::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .filter(|(key, _)| !key.trim().is_empty())
            .ok_or_else(|| CliError::InvalidData(pair.clone()))?;
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        data.insert(key.trim().to_string(), value);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulk_engine::MemoryStore;
    use serde_json::json;

    fn context() -> Context {
        let mut config = AppConfig::default();
        config.engine.batch_delay_ms = 0;
        Context::new(config, Arc::new(MemoryStore::new()))
    }

    fn run_args(action: &str, ids: &[&str], data: &[&str], fail: &[&str]) -> RunArgs {
        RunArgs {
            content_type: ContentType::BlogPost,
            action: action.to_string(),
            ids: ids.iter().map(|s| s.to_string()).collect(),
            data: data.iter().map(|s| s.to_string()).collect(),
            simulation: SimulationArgs {
                fail: fail.iter().map(|s| s.to_string()).collect(),
                latency_ms: 0,
            },
        }
    }

    #[test]
    fn test_parse_data() {
        let pairs = vec![
            r#"tags=["advent","lent"]"#.to_string(),
            "category=news".to_string(),
            "notify=true".to_string(),
        ];
        let data = parse_data(&pairs).unwrap();
        assert_eq!(data["tags"], json!(["advent", "lent"]));
        assert_eq!(data["category"], json!("news"));
        assert_eq!(data["notify"], json!(true));
    }

    #[test]
    fn test_parse_data_rejects_missing_key() {
        assert!(matches!(
            parse_data(&["=news".to_string()]),
            Err(CliError::InvalidData(_))
        ));
        assert!(matches!(
            parse_data(&["category".to_string()]),
            Err(CliError::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn test_select_then_run_selected() {
        let ctx = context();
        let ids = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        execute(
            &ctx,
            Command::Select {
                content_type: ContentType::BlogPost,
                ids,
            },
        )
        .await
        .unwrap();

        let output = execute(&ctx, Command::Run(run_args("publish", &[], &[], &["2"])))
            .await
            .unwrap();
        insta::assert_snapshot!(output, @r"
        Succeeded: 2
        Failed:    1
        Skipped:   0
        failed:
          2: HTTP 500: simulated failure for 2
        ");

        let selection = execute(
            &ctx,
            Command::Selection {
                content_type: ContentType::BlogPost,
            },
        )
        .await
        .unwrap();
        assert_eq!(selection, "No blog_post items selected");
    }

    #[tokio::test]
    async fn test_validation_error_fails_command() {
        let ctx = context();
        let err = execute(
            &ctx,
            Command::Run(run_args("change_category", &["1"], &[], &[])),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Category is required");
    }

    #[tokio::test]
    async fn test_unknown_action_fails_command() {
        let ctx = context();
        let err = execute(&ctx, Command::Run(run_args("send_email", &["1"], &[], &[])))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Bulk(BulkError::UnknownAction { .. })
        ));
    }

    #[tokio::test]
    async fn test_undo_and_history() {
        let ctx = context();
        execute(
            &ctx,
            Command::Run(run_args("feature", &["5", "6"], &[], &[])),
        )
        .await
        .unwrap();

        let undo = execute(
            &ctx,
            Command::Undo(UndoArgs {
                content_type: ContentType::BlogPost,
                simulation: SimulationArgs::default(),
            }),
        )
        .await
        .unwrap();
        assert!(undo.starts_with("Succeeded: 2"));

        let stats = execute(
            &ctx,
            Command::Stats {
                content_type: ContentType::BlogPost,
            },
        )
        .await
        .unwrap();
        assert!(stats.starts_with("Operations: 2"));

        let cleared = execute(
            &ctx,
            Command::ClearHistory {
                content_type: ContentType::BlogPost,
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared, "Cleared 2 history entries");
    }

    #[tokio::test]
    async fn test_state_persists_in_store_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "[engine]\nmax_selection = 2\n").unwrap();

        let ctx = Context::load(Some(&config), Some(dir.path().join("state"))).unwrap();
        let ids = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        let output = execute(
            &ctx,
            Command::Select {
                content_type: ContentType::Event,
                ids,
            },
        )
        .await
        .unwrap();
        assert_eq!(output, "2/2 event items selected: 1, 2");

        let ctx = Context::load(Some(&config), Some(dir.path().join("state"))).unwrap();
        let output = execute(
            &ctx,
            Command::Selection {
                content_type: ContentType::Event,
            },
        )
        .await
        .unwrap();
        assert_eq!(output, "2/2 event items selected: 1, 2");
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = Context::load(Some(&missing), Some(dir.path().join("state")))
            .err()
            .unwrap();
        match err {
            CliError::ConfigNotFound(path) => assert_eq!(path, missing),
            other => panic!("Expected missing config, got {:?}", other),
        }
        assert!(!dir.path().join("state").exists());
    }
}
