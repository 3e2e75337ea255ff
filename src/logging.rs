//! Tracing subscriber setup.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

pub const LOG_FILE_PREFIX: &str = "hrms.log";

/// Filter from `RUST_LOG` when set, otherwise from the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber: stdout, plus a daily rolling file when
/// `directory` is set. Keep the returned guard alive to flush file output.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let registry = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt::layer());

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
            if let Err(e) = registry.with(file_layer).try_init() {
                eprintln!("Logging already initialized: {e}");
            }
            Some(guard)
        }
        None => {
            if let Err(e) = registry.try_init() {
                eprintln!("Logging already initialized: {e}");
            }
            None
        }
    }
}
