//! Command-line client for a remote task list.
//!
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/tasksync/config.toml`).
//!
//! ```bash
//! # Show the first page of tasks
//! cargo run --bin tasksync
//!
//! # Against another service, filtered to high priority
//! cargo run --bin tasksync -- --base-url http://10.0.0.5:10000/api/tasks \
//!     list --filter high
//!
//! # Or via environment variables
//! TASKSYNC_BASE_URL=http://10.0.0.5:10000/api/tasks cargo run -- add "Buy milk"
//! ```

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use tasksync::cli;
use tasksync::config::{CliArgs, ClientConfig};
use tasksync::gateway::http::HttpGateway;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    // A config error ends the command; defaults are never substituted.
    let config = match ClientConfig::load(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Logs go to a file so they never interleave with command output.
    let _log_guard = init_logging(&args.log_level, args.log_file.as_deref());

    tracing::info!(base_url = %config.base_url, "tasksync starting");

    let gateway = match HttpGateway::new(&config.base_url, config.connect_timeout) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let command = args.command.unwrap_or_default();
    let mut stdout = std::io::stdout();
    let result = cli::run(command, &config, gateway, &mut stdout).await;

    match result {
        Ok(()) => {
            tracing::info!("tasksync exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("tasksync.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}
