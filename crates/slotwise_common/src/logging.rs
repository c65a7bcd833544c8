//! Logging setup shared by all Slotwise binaries.
//!
//! Call [`init_from_config`] once at startup. Library crates only use the
//! `tracing` macros and never install a subscriber themselves.

use slotwise_config::LoggingConfig;
use std::str::FromStr;
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with the default level (INFO) and stdout only.
pub fn init() {
    // No file layer, so there is no guard to keep alive.
    let _ = init_with_level(Level::INFO, None);
}

/// Initialize logging from the `[logging]` config section.
///
/// Returns the guard of the non-blocking file writer when a log directory is
/// configured. Dropping it flushes and stops the file writer, so the caller
/// keeps it alive for the lifetime of the process.
pub fn init_from_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = config
        .level
        .as_deref()
        .and_then(|l| Level::from_str(l).ok())
        .unwrap_or(Level::INFO);
    init_with_level(level, config.directory.as_deref())
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` is honoured; on top of it `slotwise=<level>` is added so our own
/// crates log at the requested level.
pub fn init_with_level(level: Level, directory: Option<&str>) -> Option<WorkerGuard> {
    let filter = || {
        let filter = EnvFilter::from_default_env();
        match format!("slotwise={}", level).parse() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        }
    };

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true);

    let (file_layer, guard) = match directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "slotwise.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // try_init: a subscriber may already be installed (tests, embedding)
    let result = tracing_subscriber::registry()
        .with(stdout_layer.with_filter(filter()))
        .with(file_layer)
        .try_init();

    match result {
        Ok(()) => info!("Logging initialized at level: {}", level),
        Err(e) => warn!("Logging already initialized: {}", e),
    }
    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init();
        let guard = init_with_level(Level::DEBUG, None);
        assert!(guard.is_none());
    }
}
