//! # Logging
//!
//! One `tracing` subscriber for every subcommand, installed before dispatch
//! so the library's readiness and mining events are never dropped.
//!
//! Output goes to stderr. Stdout carries the chain dump and the `hash`
//! report, both of which are meant to be piped.

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, colored.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// `RUST_LOG` if set and parseable, otherwise `default_directives`.
fn filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(default_directives: &str, format: LogFormat) -> Result<()> {
    let registry = tracing_subscriber::registry().with(filter(default_directives));

    let installed = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .try_init(),
    };
    installed.context("tracing subscriber already installed")?;

    tracing::debug!(?format, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_an_error_not_a_panic() {
        // The first call may lose to another test; the second never wins.
        let _ = init_logging("hashchain=debug", LogFormat::Json);
        assert!(init_logging("hashchain=debug", LogFormat::Pretty).is_err());
    }

    #[test]
    fn format_names() {
        assert_eq!(LogFormat::from_str("json", true), Ok(LogFormat::Json));
        assert_eq!(LogFormat::from_str("PRETTY", true), Ok(LogFormat::Pretty));
        assert!(LogFormat::from_str("xml", true).is_err());
    }
}
