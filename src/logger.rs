//! Debug logging support for docxr
//!
//! When debug mode is enabled via config, operations are logged to
//! ~/.docxr/docxr.log.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

/// Initialize the debug logging system
///
/// If debug_enabled is true, sets up file logging.
/// Returns the path to the log file, or None if logging is not enabled.
pub fn init_debug_logging(debug_enabled: bool) -> Result<Option<PathBuf>> {
    if !debug_enabled {
        return Ok(None);
    }

    let log_path = log_file_path()?;

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()));

    // If we can't open the log file, gracefully fall back to no logging
    match file {
        Ok(log_file) => {
            let subscriber = registry()
                .with(
                    fmt::layer()
                        .with_writer(log_file)
                        .with_ansi(false)
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false),
                )
                .with(EnvFilter::new("docxr=info"));

            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

            Ok(Some(log_path))
        }
        Err(e) => {
            eprintln!("Warning: Could not create log file: {e}");
            Ok(None)
        }
    }
}

/// Get the log file path without initializing logging
pub fn log_file_path() -> Result<PathBuf> {
    let home_dir =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home_dir.join(".docxr").join("docxr.log"))
}
