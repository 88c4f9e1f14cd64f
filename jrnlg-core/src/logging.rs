//! Log output for the engine: an `env_logger` backend writing to stderr.

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Maps `DEBUG`, `INFO`, `WARN`/`WARNING` and `ERROR` (any case) to a level filter.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_ascii_uppercase().as_str() {
        "DEBUG" => Some(LevelFilter::Debug),
        "INFO" => Some(LevelFilter::Info),
        "WARN" | "WARNING" => Some(LevelFilter::Warn),
        "ERROR" => Some(LevelFilter::Error),
        _ => None,
    }
}

/// Installs the global logger. Unknown levels fall back to `info`.
///
/// Only the first call installs anything; later calls return quietly.
pub fn init_logging(level: &str) {
    let filter = parse_level(level).unwrap_or(LevelFilter::Info);
    let installed = Builder::new()
        .filter_level(filter)
        .target(Target::Stderr)
        .format_timestamp(None)
        .try_init();
    if installed.is_err() {
        log::debug!("logger already initialized; keeping existing configuration");
    }
}
