//! Structured logging setup.

use crate::config::TelemetrySettings;
use thiserror::Error;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    filter::ParseError,
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured log level is not a valid filter directive.
    #[error("invalid log filter '{directive}': {source}")]
    InvalidFilter {
        /// Rejected directive.
        directive: String,
        /// Parser failure.
        #[source]
        source: ParseError,
    },

    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Installs the process-wide tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level when it is set and
/// valid.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the configured level cannot be parsed or
/// a subscriber has already been installed.
pub fn init(settings: &TelemetrySettings) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(&settings.log_level).map_err(|source| TelemetryError::InvalidFilter {
            directive: settings.log_level.clone(),
            source,
        })
    })?;

    let output = if settings.json {
        fmt::layer().json().with_current_span(true).boxed()
    } else {
        fmt::layer().compact().boxed()
    };

    Registry::default().with(filter).with(output).try_init()?;
    Ok(())
}
