//! File logging
//!
//! The terminal belongs to the TUI, so events only go to a log file next to
//! the config. `DIRVIEW_LOG` overrides the configured filter.

use std::path::Path;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILE_NAME: &str = "dirview.log";

/// Build the event filter: environment first, then the configured level,
/// then `info`
pub fn build_filter(configured: &str) -> EnvFilter {
    std::env::var("DIRVIEW_LOG")
        .ok()
        .and_then(|env| EnvFilter::try_new(env).ok())
        .or_else(|| EnvFilter::try_new(configured).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install the global subscriber writing to `<dir>/dirview.log`.
///
/// The returned guard flushes pending events when dropped; keep it alive
/// for the whole run.
pub fn init_logger(dir: &Path, level: &str) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_ansi(false),
        )
        .with(build_filter(level))
        .init();

    info!(log_dir = %dir.display(), level, "logging initialized");
    Ok(guard)
}
