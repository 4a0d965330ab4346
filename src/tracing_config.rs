use std::env;

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, fmt, fmt::MakeWriter, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::{ConfigPaths, LogLevel};

const LOG_FORMAT_VAR: &str = "PLAYCTL_LOG_FORMAT";

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_directive()))
}

fn json_requested() -> bool {
    env::var(LOG_FORMAT_VAR).is_ok_and(|format| format == "json")
}

/// Compact, ANSI-free layer for log files.
fn file_layer<S, W>(writer: W) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'span> LookupSpan<'span> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .compact()
        .with_target(true)
        .with_level(true)
        .with_writer(writer)
        .with_ansi(false)
}

/// Initialize tracing for the application
///
/// Uses `RUST_LOG` if set, otherwise `default_level`. Output is pretty
/// printed unless `PLAYCTL_LOG_FORMAT=json`.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init(default_level: LogLevel) -> Result<(), Box<dyn std::error::Error>> {
    let registry = tracing_subscriber::registry().with(env_filter(default_level));

    if json_requested() {
        registry
            .with(fmt::layer().json().with_target(true).with_level(true))
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    Ok(())
}

/// Initialize tracing with an additional daily-rotated log file
///
/// Logs go to stdout as with [`init`] and to a compact, ANSI-free file in
/// the application log directory. Keep the returned guard alive for as long
/// as logs should be flushed to the file.
///
/// # Errors
/// Returns error if the log directory cannot be created or a global
/// subscriber is already installed
pub fn init_with_file(default_level: LogLevel) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    const DAYS_TO_KEEP: usize = 7;

    let log_dir = ConfigPaths::log_dir()?;
    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .max_log_files(DAYS_TO_KEEP)
        .filename_prefix("playctl")
        .filename_suffix("log")
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let registry = tracing_subscriber::registry().with(env_filter(default_level));

    if json_requested() {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stdout),
            )
            .with(file_layer(non_blocking))
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stdout),
            )
            .with(file_layer(non_blocking))
            .try_init()?;
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::fs;

    use tempfile::TempDir;
    use tracing_subscriber::{fmt, layer::SubscriberExt};

    use super::file_layer;

    #[test]
    fn file_layer_stacks_under_stdout_layer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("playctl.log");
        let (writer, guard) = tracing_appender::non_blocking(fs::File::create(&path).unwrap());

        let subscriber = tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::sink))
            .with(file_layer(writer));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "playctl::test", media_id = 5, "Backend queried");
        });
        drop(guard);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Backend queried"));
        assert!(content.contains("playctl::test"));
        assert!(content.contains("media_id=5"));
        assert!(!content.contains('\u{1b}'));
    }
}
