// src/logging.rs

//! Logging setup for `dlpilot` using `tracing` + `tracing-subscriber`.
//!
//! The level comes from the `--log-level` flag when given, else the
//! `DLPILOT_LOG` environment variable (any `tracing::Level` name, e.g.
//! "info" or "debug"), else `info`. Logs go to STDERR; stdout stays free
//! for the supervised tool's own output.

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    fmt()
        .with_max_level(resolve_level(cli_level))
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn resolve_level(cli_level: Option<LogLevel>) -> tracing::Level {
    match cli_level {
        Some(LogLevel::Error) => tracing::Level::ERROR,
        Some(LogLevel::Warn) => tracing::Level::WARN,
        Some(LogLevel::Info) => tracing::Level::INFO,
        Some(LogLevel::Debug) => tracing::Level::DEBUG,
        Some(LogLevel::Trace) => tracing::Level::TRACE,
        None => std::env::var("DLPILOT_LOG")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(tracing::Level::INFO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The CLI flag wins over whatever the environment says.
    #[test]
    fn test_cli_flag_beats_env() {
        assert_eq!(resolve_level(Some(LogLevel::Trace)), tracing::Level::TRACE);
        assert_eq!(resolve_level(Some(LogLevel::Error)), tracing::Level::ERROR);
    }
}
