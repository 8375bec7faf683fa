// DAX - Dynamic Analysis eXplorer
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Logging configuration for DAX components
//!
//! Provides centralized logging setup with:
//! - Structured console output on stderr, leaving stdout to reports
//! - Optional file logging to a temporary directory
//! - Environment variable support (RUST_LOG)

use eyre::Result;
use std::{
    env, fs,
    path::PathBuf,
    sync::{Once, OnceLock},
};
use tracing::Level;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt::{self, time::LocalTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Keeps the non-blocking file writer alive for the lifetime of the process.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize logging for DAX components
///
/// This function sets up:
/// - Console logging on stderr with timestamps and targets
/// - Optionally, file logging to a temporary directory with daily rotation
/// - Environment variable support for log levels (RUST_LOG)
/// - Default INFO level if no RUST_LOG is set
///
/// # Arguments
/// * `component_name` - Name of the component (e.g., "dax")
/// * `enable_file_logging` - Whether to also write logs to a file
///
/// # Returns
/// * `Result<Option<PathBuf>>` - The log directory when file logging is enabled
pub fn init_logging(component_name: &str, enable_file_logging: bool) -> Result<Option<PathBuf>> {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_timer(LocalTime::rfc_3339())
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(default_filter("info")?);

    if enable_file_logging {
        let log_dir = create_log_directory(component_name)?;

        let file_appender = rolling::daily(&log_dir, format!("{component_name}.log"));
        let (non_blocking_appender, guard) = non_blocking(file_appender);
        let _ = FILE_GUARD.set(guard);

        // File output is more verbose for debugging
        let file_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(LocalTime::rfc_3339())
            .with_ansi(false)
            .with_writer(non_blocking_appender)
            .with_filter(default_filter("debug")?);

        tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {}", e))?;

        tracing::info!(
            component = component_name,
            log_dir = %log_dir.display(),
            "Logging initialized with console and file output"
        );
        Ok(Some(log_dir))
    } else {
        tracing_subscriber::registry()
            .with(console_layer)
            .try_init()
            .map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {}", e))?;

        tracing::debug!(component = component_name, "Logging initialized with console output only");
        Ok(None)
    }
}

/// Build a filter from RUST_LOG, falling back to `default_level`.
fn default_filter(default_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| eyre::eyre!("Failed to create environment filter: {}", e))
}

/// Create log directory in system temp folder
fn create_log_directory(component_name: &str) -> Result<PathBuf> {
    let log_dir = env::temp_dir().join("dax-logs").join(component_name);
    fs::create_dir_all(&log_dir)?;
    Ok(log_dir)
}

/// Initialize simple logging (console only, no fancy formatting)
///
/// This is useful for tests or simple utilities that don't need
/// the full logging setup.
///
/// # Arguments
/// * `level` - The default log level to use
pub fn init_simple_logging(level: Level) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(default_filter(level.as_str())?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to initialize simple logging: {}", e))?;

    Ok(())
}

// Global test logging initialization - ensures logging is only set up once across all tests
static TEST_LOGGING_INIT: Once = Once::new();

/// Safe logging initialization for tests - can be called multiple times without crashing
///
/// Console-only, INFO by default but respects RUST_LOG. Initialization errors are ignored:
/// they mean a subscriber is already installed, which is fine for tests.
///
/// # Usage
/// ```rust
/// use dax_common::logging;
/// use tracing::info;
///
/// logging::ensure_test_logging(None);
/// info!("This will work safely in any test!");
/// ```
pub fn ensure_test_logging(default_level: Option<Level>) {
    TEST_LOGGING_INIT.call_once(|| {
        let _ = init_simple_logging(default_level.unwrap_or(Level::INFO));
    });
}
