//! Tracing setup
//!
//! `RUST_LOG` wins over the configured level. Command-line runs log to
//! stderr; the terminal UI logs to a file because ratatui owns the screen.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Logs to stderr.
pub fn init_stderr(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(level))
        .try_init();
}

/// Logs to `path` through a non-blocking writer.
///
/// The returned guard flushes buffered entries when dropped, so hold it for
/// the whole session. Returns `None` if `path` has no usable file name.
pub fn init_file(level: &str, path: &Path) -> Option<WorkerGuard> {
    let dir = path.parent()?;
    let file_name = path.file_name()?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(env_filter(level))
        .with_ansi(false)
        .try_init();

    Some(guard)
}
