//! gantry - Tag-driven package release publisher CLI

mod cli;
mod exit_codes;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::Cli;

fn main() -> anyhow::Result<()> {
    let guard = init_tracing();

    let code = Cli::parse().execute()?;

    // Flush buffered log lines before terminating the process
    drop(guard);
    if code != exit_codes::SUCCESS {
        std::process::exit(code);
    }
    Ok(())
}

/// Console layer filtered by RUST_LOG (default: warn), plus an always-on
/// debug-level JSON file layer under ~/.gantry/logs/ when the home
/// directory is writable.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(console_filter);

    let (file_layer, guard) = match log_directory() {
        Some(log_dir) => {
            let appender = tracing_appender::rolling::daily(&log_dir, "gantry.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

fn log_directory() -> Option<std::path::PathBuf> {
    let log_dir = dirs::home_dir()?.join(".gantry").join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;
    Some(log_dir)
}
