//! Logging setup
//!
//! The crate logs through `tracing`. Embedders with their own subscriber need
//! nothing from here; everyone else calls [`init`] once at startup.
//!
//! - `FLOWSECRETS_LOG` sets the filter (default `flowsecrets_core=warn`)
//! - `FLOWSECRETS_DEBUG=1` sends output to a debug file in the temp directory
//!   instead of stderr, for hosts where stderr isn't visible
//!
//! Secret values are never logged, only names.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directives
pub const LOG_FILTER_ENV: &str = "FLOWSECRETS_LOG";
/// Enables the debug log file
pub const DEBUG_ENV: &str = "FLOWSECRETS_DEBUG";

const DEFAULT_FILTER: &str = "flowsecrets_core=warn";

/// Install the global subscriber
///
/// Returns `false` if a subscriber was already installed.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file = if debug_enabled() { open_log_file() } else { None };
    let (file_layer, stderr_layer) = match file {
        Some(file) => (
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
            None,
        ),
        None => (
            None,
            Some(fmt::layer().with_writer(std::io::stderr).without_time()),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok()
}

fn debug_enabled() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn open_log_file() -> Option<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path())
        .ok()
}

/// Get the path to the debug log file
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("flowsecrets-debug.log")
}

/// Truncate the debug log file
pub fn clear_log() -> std::io::Result<()> {
    File::create(log_file_path()).map(drop)
}
