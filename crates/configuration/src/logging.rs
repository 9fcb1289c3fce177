use crate::settings::LoggingSettings;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

/// Builds the log filter: `RUST_LOG` wins, otherwise the configured level.
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&settings.level).unwrap_or_else(|e| {
            eprintln!("Invalid log level '{}' ({}), falling back to 'info'", settings.level, e);
            EnvFilter::new("info")
        })
    })
}

/// Opens a daily-rotated, non-blocking log file when a log directory is configured.
///
/// The returned guard must be kept alive for the lifetime of the program,
/// otherwise buffered log lines are dropped on exit.
pub fn file_writer(settings: &LoggingSettings) -> Option<(NonBlocking, WorkerGuard)> {
    let directory = settings.directory.as_ref()?;
    let appender = tracing_appender::rolling::daily(directory, &settings.file_prefix);
    Some(tracing_appender::non_blocking(appender))
}
