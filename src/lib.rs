pub mod assistant;
pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod dates;
pub mod errors;
pub mod mapper;
pub mod models;
pub mod projection;
pub mod redaction;
pub mod schema;
pub mod service;
pub mod store;

use crate::cli::Cli;
use crate::config::APP_DIR_NAME;
use crate::errors::AppError;
use crate::redaction::Redactor;
use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Some(data_dir) = dirs::data_local_dir() {
        if let Err(error) = init_tracing(&data_dir.join(APP_DIR_NAME)) {
            eprintln!("warning: logging disabled: {error:#}");
        }
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("error: failed to start runtime: {error}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(commands::execute(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!(error = %message, "command failed");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(app_data_dir: &Path) -> anyhow::Result<()> {
    let log_dir = app_data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "notion-todos.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| anyhow::anyhow!(error.to_string()))
}

/// User-facing text for a failed action, with secrets masked.
pub fn to_client_error(error: AppError) -> String {
    Redactor::new(true).redact(&error.user_message()).content
}
