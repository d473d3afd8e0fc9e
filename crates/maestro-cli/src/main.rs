//! maestro - connect your Spotify account, read your music personality
//! analysis, and generate AI playlists from the terminal.

mod commands;
mod render;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use maestro_core::auth::AuthState;
use maestro_core::{ApiError, Config};
use tokio::sync::watch;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{Command, USAGE};

/// Log file name prefix inside `<data_dir>/logs`
const LOG_FILE: &str = "maestro.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr, and also to a daily log file when `log_dir` is usable.
/// The returned guard must stay alive for the file writer to flush.
fn init_tracing(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir.filter(|dir| std::fs::create_dir_all(dir).is_ok()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();
    guard
}

/// User-facing notice for a session state transition, if it deserves one
fn session_notice(previous: AuthState, current: AuthState) -> Option<&'static str> {
    match (previous, current) {
        (_, AuthState::Refreshing) => Some("Session expired, refreshing..."),
        (AuthState::Refreshing, AuthState::Unauthenticated) => Some("Your session has ended."),
        _ => None,
    }
}

/// Log session state transitions, and tell the user when the session changes
/// underneath a command
fn watch_session(mut states: watch::Receiver<AuthState>) {
    tokio::spawn(async move {
        let mut previous = *states.borrow_and_update();
        while states.changed().await.is_ok() {
            let current = *states.borrow_and_update();
            debug!(from = previous.label(), to = current.label(), "Session state changed");
            if let Some(notice) = session_notice(previous, current) {
                eprintln!("{}", notice);
            }
            previous = current;
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let config = Config::load()?;
    let log_guard = init_tracing(config.data_dir().ok().map(|dir| dir.join("logs")));
    info!(api_url = %config.api_url, "maestro starting");

    let api = config.api_client()?;
    let state = api.store().initialize().await;
    info!(state = state.label(), "Session store initialized");
    watch_session(api.store().subscribe());

    if let Err(e) = commands::run(&api, &config, command).await {
        eprintln!("Error: {}", e);
        if e.downcast_ref::<ApiError>().is_some_and(ApiError::requires_login) {
            eprintln!("Run `maestro login` to connect your Spotify account.");
        }
        // exit() skips destructors; flush the log file first
        drop(log_guard);
        std::process::exit(1);
    }

    drop(log_guard);
    Ok(())
}
