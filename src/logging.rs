//! Logging configuration and initialization.
//!
//! This module handles tracing subscriber setup based on CLI verbosity flags
//! and environment variables.

use crate::cli::LogLevel;
use tracing_subscriber::EnvFilter;

fn level_directive(level: LogLevel) -> &'static str {
    use LogLevel::*;
    match level {
        Warn => "warn",
        Info => "info",
        Debug => "debug",
        Trace => "trace",
    }
}

/// Build the filter for `level`.
///
/// Precedence:
/// 1. `quiet` forces WARN+.
/// 2. `-vv` => TRACE.
/// 3. `-v`  => DEBUG.
/// 4. Else `RUST_LOG` if set and valid, otherwise INFO.
fn build_filter(level: LogLevel, rust_log: Option<&str>) -> EnvFilter {
    match (level, rust_log) {
        (LogLevel::Info, Some(directives)) => {
            EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
        }
        _ => EnvFilter::new(level_directive(level)),
    }
}

/// Configure the global tracing subscriber according to CLI verbosity flags.
pub fn configure_logging(level: LogLevel) {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level, rust_log.as_deref()))
        .with_target(false)
        .init();
}
