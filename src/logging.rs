//! Logging initialization built on `tracing`.
//!
//! Library code emits `tracing` events; hosts pick a subscriber. These
//! helpers install the standard stderr subscriber with an `EnvFilter`
//! honoring `TICKETRY_LOG`.

use crate::error::{Result, TicketryError};
use tracing_subscriber::EnvFilter;

/// Environment variable controlling the log filter.
pub const LOG_ENV_VAR: &str = "TICKETRY_LOG";

/// Initialize logging for a host process.
///
/// `verbose` raises the default level (0 = warn, 1 = info, 2+ = debug);
/// `quiet` silences everything except errors; an explicit `filter`
/// string wins over both. `TICKETRY_LOG` wins over the computed default.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed or the filter
/// directive cannot be parsed.
pub fn init_logging(verbose: u8, quiet: bool, filter: Option<&str>) -> Result<()> {
    let default_directive = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };

    let env_filter = match filter {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|e| TicketryError::Config(format!("invalid log filter: {e}")))?,
        None => EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(default_directive)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| TicketryError::Config(format!("failed to initialize logging: {e}")))
}

/// Initialize logging for tests; safe to call repeatedly.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
