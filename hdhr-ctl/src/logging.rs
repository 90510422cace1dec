//! Logging setup with optional file output.
//!
//! Console output goes to stderr and defaults to warnings only, so the
//! interactive prompt on stdout stays readable. When a log directory is
//! configured, a daily rotated file is written as well and files older than
//! the retention period are removed at startup.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{Local, TimeDelta};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_NAME: &str = "hdhrctl.log";

/// Initialize the logging system.
///
/// # Arguments
/// * `log_dir` - Directory for log files, `None` for console only
/// * `retention_days` - Number of days to keep log files
/// * `verbose` - Whether to enable debug-level logging
/// * `level` - Default filter when `RUST_LOG` is unset and not verbose
pub fn init_logging(
    log_dir: Option<&Path>,
    retention_days: u64,
    verbose: bool,
    level: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = if verbose { "debug" } else { level.unwrap_or("warn") };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            clean_old_logs(dir, retention_days)?;

            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            // The guard flushes on drop; keep it for the whole process.
            let _ = Box::leak(Box::new(guard));

            Some(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_level(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_timer(LocalTimeTimer),
            )
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true)
                .with_timer(LocalTimeTimer),
        )
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to set default subscriber: {}", e))?;

    // Route log:: macros (used throughout both crates) into tracing.
    tracing_log::LogTracer::init().map_err(|e| format!("Failed to initialize LogTracer: {}", e))?;

    Ok(())
}

/// Remove rotated log files older than `retention_days`.
///
/// A retention period too long to represent keeps every file.
fn clean_old_logs(log_dir: &Path, retention_days: u64) -> io::Result<()> {
    let cutoff = i64::try_from(retention_days)
        .ok()
        .and_then(TimeDelta::try_days)
        .and_then(|retention| Local::now().checked_sub_signed(retention));
    let Some(cutoff) = cutoff else {
        return Ok(());
    };

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_ours = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name.starts_with(LOG_FILE_NAME));
        if !path.is_file() || !is_ours {
            continue;
        }

        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => chrono::DateTime::<Local>::from(modified),
            Err(_) => continue,
        };
        if modified < cutoff {
            if let Err(e) = fs::remove_file(&path) {
                eprintln!("Failed to remove old log file {:?}: {}", path, e);
            }
        }
    }

    Ok(())
}

/// Local time stamps for log lines.
#[derive(Debug, Clone, Copy)]
struct LocalTimeTimer;

impl fmt::time::FormatTime for LocalTimeTimer {
    fn format_time(&self, w: &mut fmt::format::Writer) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_old_logs_keeps_recent_and_foreign_files() {
        let dir = std::env::temp_dir().join(format!("hdhrctl-logs-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let ours = dir.join("hdhrctl.log.2026-10-19");
        let foreign = dir.join("other.log");
        fs::write(&ours, "x").unwrap();
        fs::write(&foreign, "x").unwrap();

        clean_old_logs(&dir, 7).unwrap();
        assert!(ours.exists());
        assert!(foreign.exists());

        // Zero retention puts the cutoff at "now", after the files were written.
        std::thread::sleep(std::time::Duration::from_millis(20));
        clean_old_logs(&dir, 0).unwrap();
        assert!(!ours.exists());
        assert!(foreign.exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_clean_old_logs_huge_retention_keeps_files() {
        let dir = std::env::temp_dir().join(format!("hdhrctl-logs-huge-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let ours = dir.join("hdhrctl.log.2026-10-19");
        fs::write(&ours, "x").unwrap();

        for days in [100_000_000, 100_000_000_000_000, i64::MAX as u64 + 1, u64::MAX] {
            clean_old_logs(&dir, days).unwrap();
            assert!(ours.exists());
        }

        fs::remove_dir_all(&dir).unwrap();
    }
}
