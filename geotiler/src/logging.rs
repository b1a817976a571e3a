//! Logging setup for geotiler binaries.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! caller's choice. [`init_logging`] provides the standard setup:
//! - compact output on stderr, so rendered images can go to stdout
//! - optional plain-text log file written through a non-blocking worker
//! - verbosity from `-v` flags, overridden by `RUST_LOG`

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Maps a `-v` count to a default filter directive.
pub fn filter_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize logging.
///
/// # Arguments
///
/// * `verbosity` - number of `-v` flags; ignored when `RUST_LOG` is set
/// * `log_file` - optional file receiving a copy of every event; truncated
///   at startup, parent directories created as needed
///
/// # Errors
///
/// Returns an error if the log file cannot be created.
pub fn init_logging(verbosity: u8, log_file: Option<&Path>) -> Result<LoggingGuard, io::Error> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_for_verbosity(verbosity)));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    let (file_layer, file_guard) = match log_file {
        Some(path) => {
            let (dir, name) = split_log_path(path)?;
            fs::create_dir_all(&dir)?;
            fs::write(path, "")?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_timer(LocalTime::rfc_3339())
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // A subscriber may already be installed (tests, embedding apps)
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn split_log_path(path: &Path) -> Result<(std::path::PathBuf, std::ffi::OsString), io::Error> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log path has no file name: {}", path.display()),
        )
    })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    Ok((dir, name.to_os_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_for_verbosity() {
        assert_eq!(filter_for_verbosity(0), "warn");
        assert_eq!(filter_for_verbosity(1), "info");
        assert_eq!(filter_for_verbosity(2), "debug");
        assert_eq!(filter_for_verbosity(9), "trace");
    }

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path(Path::new("logs/geotiler.log")).unwrap();
        assert_eq!(dir, Path::new("logs"));
        assert_eq!(name, "geotiler.log");

        let (dir, _) = split_log_path(Path::new("geotiler.log")).unwrap();
        assert_eq!(dir, Path::new("."));

        assert!(split_log_path(Path::new("/")).is_err());
    }

    #[test]
    fn test_init_creates_and_truncates_log_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log_path = temp_dir.path().join("nested").join("geotiler.log");
        std::fs::create_dir_all(log_path.parent().unwrap()).unwrap();
        std::fs::write(&log_path, "old log data").unwrap();

        let guard = init_logging(0, Some(&log_path)).unwrap();
        assert!(log_path.exists());
        drop(guard);
    }
}
