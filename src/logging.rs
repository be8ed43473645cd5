//! Logging setup on the tracing ecosystem.
//!
//! Output goes to a daily-rotated file so it never draws over the terminal
//! UI. `RUST_LOG` overrides the default filter.

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "apto=info,warn";

/// Prefix of the rolling log files.
const LOG_FILE_PREFIX: &str = "apto.log";

/// Initialize logging into the platform data directory.
///
/// Logs land in:
/// - Linux: `~/.local/share/apto/logs/`
/// - macOS: `~/Library/Application Support/apto/logs/`
/// - Windows: `C:\Users\<User>\AppData\Local\apto\logs\`
///
/// Returns the directory used.
///
/// # Errors
///
/// Fails if the directory cannot be determined or created, or if a global
/// subscriber is already installed.
pub fn init() -> anyhow::Result<PathBuf> {
    let log_dir = get_log_directory()?;
    init_in(&log_dir)?;
    Ok(log_dir)
}

/// Initialize logging into `log_dir`.
pub fn init_in(log_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter_from(std::env::var("RUST_LOG").ok().as_deref()));

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "APTO starting up");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");
    Ok(())
}

/// Parse `directives`, falling back to the default filter.
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("apto").join("logs"))
}

/// Where log files are written, for display to users.
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}

/// Log a clean shutdown.
pub fn shutdown() {
    tracing::info!("APTO shutting down");
}
