//! Tracing subscriber setup driven by [`LoggingConfig`].
//!
//! The codec itself only emits `tracing` events; installing a subscriber is the
//! host's choice. [`init_logging`] is a convenience for hosts and tests that do
//! not bring their own.

use crate::config::LoggingConfig;
use std::path::Path;
use std::sync::Once;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

static INIT: Once = Once::new();

/// Install a global subscriber for `config`.
///
/// Only the first call has any effect. When file logging is on, the returned
/// guard must be kept alive for buffered lines to be flushed.
///
/// # Example
/// ```
/// use login_protocol::config::LoggingConfig;
/// use login_protocol::utils::logging::init_logging;
/// use tracing::Level;
///
/// let config = LoggingConfig {
///     log_level: Level::DEBUG,
///     ..Default::default()
/// };
///
/// let _guard = init_logging(&config);
/// ```
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let mut guard = None;

    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{target}={level}",
                target = config.app_name.replace('-', "_"),
                level = config.log_level
            ))
        });

        let file_writer = match (config.log_to_file, &config.log_file_path) {
            (true, Some(path)) => {
                let path = Path::new(path);
                let dir = path.parent().unwrap_or_else(|| Path::new("."));
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("{}.log", config.app_name));
                let (writer, file_guard) =
                    tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
                guard = Some(file_guard);
                Some(writer)
            }
            _ => None,
        };

        let (console_json, console_plain) = match (config.log_to_console, config.json_format) {
            (true, true) => (Some(fmt::layer().json().with_writer(std::io::stdout)), None),
            (true, false) => (None, Some(fmt::layer().with_writer(std::io::stdout))),
            _ => (None, None),
        };
        let (file_json, file_plain) = match (file_writer, config.json_format) {
            (Some(w), true) => (Some(fmt::layer().json().with_writer(w)), None),
            (Some(w), false) => (None, Some(fmt::layer().with_ansi(false).with_writer(w))),
            (None, _) => (None, None),
        };

        let installed = registry()
            .with(filter)
            .with(console_json)
            .with(console_plain)
            .with(file_json)
            .with(file_plain)
            .try_init();

        if installed.is_ok() {
            tracing::info!(level = %config.log_level, "Logging initialized");
        }
    });

    guard
}

/// Setup default logging configuration for quick startup
pub fn setup_default_logging() {
    // No file output, so there is no guard to keep
    let _ = init_logging(&LoggingConfig::default());
}
