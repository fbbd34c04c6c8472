//! Logging Infrastructure
//!
//! stdout output (plain or JSON) plus an optional daily rolling file.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Keeps the non-blocking file writer flushing until dropped
#[must_use = "dropping the guard stops file logging"]
pub struct LoggerGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the global subscriber.
///
/// `RUST_LOG` overrides `level`. A second call is a no-op (tests).
pub fn init_logger(level: &str, json: bool, log_dir: Option<&str>) -> LoggerGuard {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    };

    let mut dir_error = None;
    let (file_layer, file_guard) = match log_dir {
        Some(dir) => match std::fs::create_dir_all(Path::new(dir)) {
            Ok(()) => {
                let appender = rolling::daily(dir, "store-server.log");
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(writer);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                dir_error = Some(e);
                (None, None)
            }
        },
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if let (true, Some(e), Some(dir)) = (installed, dir_error, log_dir) {
        tracing::warn!(dir = %dir, error = %e, "Log directory unavailable, logging to stdout only");
    }

    LoggerGuard {
        _file_guard: file_guard,
    }
}
