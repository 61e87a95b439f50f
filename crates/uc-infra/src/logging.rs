//! Daemon logging bootstrap (spec.md §1 "out of scope: logging backend" —
//! the core only sees a [`LoggerPort`]). `uc-tauri`'s `bootstrap::logging`
//! wires `tauri_plugin_log` for a GUI webview console; this daemon has no
//! webview, so the equivalent plumbing here is `tracing-subscriber` +
//! `tracing-appender`, writing to `paths.log_dir/clipman.log` with a
//! daily-rolling non-blocking writer, honoring `CLIPMAN_LOG` the way the
//! teacher's build honors its own debug/release level split.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};
use uc_core::ports::logger::{LogLevel, LoggerPort};

const LOG_ENV: &str = "CLIPMAN_LOG";

/// Installs the global `tracing` subscriber. The returned [`WorkerGuard`]
/// must be kept alive for the process lifetime or buffered log lines are
/// dropped on exit.
pub fn init(log_dir: &Path, daemonized: bool) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "clipman.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt::Subscriber::builder().with_env_filter(filter).with_target(true);

    if daemonized {
        builder.with_writer(non_blocking).with_ansi(false).init();
    } else {
        builder.with_writer(non_blocking).init();
    }

    Ok(guard)
}

/// [`LoggerPort`] implementation forwarding to `tracing`'s global
/// dispatcher, so domain code depends only on the port trait while the
/// actual backend lives entirely in this crate.
pub struct TracingLogger;

impl LoggerPort for TracingLogger {
    fn log(&self, level: LogLevel, subsystem: &str, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(subsystem, "{message}"),
            LogLevel::Info => tracing::info!(subsystem, "{message}"),
            LogLevel::Warn => tracing::warn!(subsystem, "{message}"),
            LogLevel::Error => tracing::error!(subsystem, "{message}"),
        }
    }
}
