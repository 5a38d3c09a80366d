//! Installs the global `tracing` subscriber.

use crate::error::{ErrorType, IntoResult, Result};
use anyhow::anyhow;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber, writing to stderr.
///
/// If `RUST_LOG` is set it decides what is logged. Otherwise only this crate's events at `level`
/// and above are logged.
///
/// # Errors
/// A `Logging` error if a global subscriber has already been installed.
pub fn init_logger(level: LevelFilter) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Unable to install the tracing subscriber: {e}"))
        .pub_result(ErrorType::Logging)
}

fn env_filter(level: LevelFilter) -> EnvFilter {
    match std::env::var("RUST_LOG").ok() {
        // RUST_LOG exists; use it.
        Some(_) => EnvFilter::from_default_env(),
        // RUST_LOG does not exist; use the given level for this crate only.
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        // Other tests may or may not have installed a subscriber already, so only the second
        // call is certain to fail.
        let _ = init_logger(LevelFilter::DEBUG);
        let err = init_logger(LevelFilter::DEBUG).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Logging);
    }
}
