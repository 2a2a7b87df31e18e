//! faltu - command-line client for the FaltuAI backend.
//!
//! Log in with Google, run stock analyses and follow them to completion,
//! roast a resume, and take skill assessments from the terminal.

mod args;
mod commands;
mod render;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use faltu_core::api::ApiError;
use faltu_core::config::Config;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::Args;
use commands::Cli;

// ============================================================================
// Constants
// ============================================================================

/// Directory for rolling log files; unset means stderr only
const LOG_DIR_ENV: &str = "FALTU_LOG_DIR";

const LOG_FILE_PREFIX: &str = "faltu.log";

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the file writer on drop and must outlive `main`.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir.trim(), LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();

    let args = Args::from_env();
    let Some(command) = args.command() else {
        render::print_usage();
        return Ok(ExitCode::SUCCESS);
    };
    if matches!(command, "help" | "--help" | "-h") {
        render::print_usage();
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    info!(command = command, backend = %config.backend_url, "faltu starting");

    let cli = Cli::new(config)?;
    // Returning instead of exiting lets the log guard flush
    match commands::run(&cli, command, &args).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            report_error(&cli, &e);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// What the user is told about a failed command
#[derive(Debug, PartialEq)]
struct Failure {
    /// The server rejected the token, or there was none: drop it either way
    clear_credential: bool,
    lines: Vec<String>,
}

fn describe_failure(err: &anyhow::Error) -> Failure {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Unauthorized) => Failure {
            clear_credential: true,
            lines: vec![
                "You are not logged in. Run `faltu login` to sign in with Google.".to_string(),
            ],
        },
        Some(api_err) => {
            let mut lines = vec![format!("Error: {}", api_err)];
            if api_err.is_retryable() {
                lines.push("This may be temporary. Please try again.".to_string());
            }
            Failure {
                clear_credential: false,
                lines,
            }
        }
        None => Failure {
            clear_credential: false,
            lines: vec![format!("Error: {:#}", err)],
        },
    }
}

/// Print a failure in terms the user can act on.
fn report_error(cli: &Cli, err: &anyhow::Error) {
    let failure = describe_failure(err);
    if failure.clear_credential {
        if let Err(e) = cli.gate.logout() {
            warn!(error = %e, "Failed to clear credential");
        }
    } else {
        error!(error = %format!("{:#}", err), "Command failed");
    }
    for line in &failure.lines {
        eprintln!("{}", line);
    }
}
