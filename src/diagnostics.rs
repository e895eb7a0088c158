//! Diagnostics event log
//!
//! Every copy, skip and archive event is appended to a plain-text log file
//! (`app.log` by default). With `--verbose` the same events are mirrored to
//! stderr. The filter defaults to `info` and can be changed with `SHPBUNDLE_LOG`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::Result;
use crate::error::fs::{create_dir_failed, io_error};

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV: &str = "SHPBUNDLE_LOG";

/// Build the subscriber writing to `log_path`
pub fn subscriber(
    log_path: &Path,
    verbose: bool,
) -> Result<impl tracing::Subscriber + Send + Sync> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| create_dir_failed(parent, &e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| io_error(format!("failed to open {}: {e}", log_path.display())))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file));
    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer))
}

/// Install the process-wide subscriber
pub fn init(log_path: &Path, verbose: bool) -> Result<()> {
    subscriber(log_path, verbose)?
        .try_init()
        .map_err(|e| io_error(format!("failed to initialize diagnostics: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_events_are_appended_to_file() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("logs/app.log");
        std::fs::create_dir_all(temp.path().join("logs")).unwrap();
        std::fs::write(&log_path, "previous line\n").unwrap();

        let subscriber = subscriber(&log_path, false).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(file = "资产点状图.qix", "Source file missing, skipping copy");
            tracing::debug!("filtered out at the default level");
        });

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.starts_with("previous line\n"));
        assert!(content.contains("WARN"));
        assert!(content.contains("Source file missing, skipping copy"));
        assert!(content.contains("资产点状图.qix"));
        assert!(!content.contains("filtered out"));
    }

    #[test]
    fn test_creates_missing_parent() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("nested/dir/app.log");

        assert!(subscriber(&log_path, true).is_ok());
        assert!(log_path.is_file());
    }
}
