//! `bulk` - run bulk actions against CMS content from the terminal.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bulk_cli::{execute, Cli, Context};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let ctx = match Context::load(cli.config.as_deref(), cli.store) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("Failed to initialize: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match execute(&ctx, cli.command).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
