//! Tracing subscriber set-up for processes embedding the client.
//!
//! The subscriber writes to standard error in the configured [`LogFormat`].
//! Exchanges log under the `ews_protocol::dispatch` target and, when document
//! tracing is on, include every outbound and inbound SOAP document at
//! `TRACE`, so a filter such as `ews_protocol::dispatch=trace` isolates them.

use std::io::{self, IsTerminal};

use ews_config::{Config, LogFormat};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Proof that the process-wide subscriber is in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Reasons the subscriber could not be installed.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// `log_filter` is not a valid `EnvFilter` directive list.
    #[error("log filter '{filter}' is invalid: {message}")]
    InvalidFilter {
        /// The rejected directive list.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Some other code installed a global subscriber first.
    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(SetGlobalDefaultError),
}

/// Installs the process-wide subscriber on first use.
///
/// The first successful call wins; later calls return a handle without
/// reconfiguring anything, even when `config` differs.
///
/// # Examples
///
/// ```rust
/// use ews_client::telemetry;
/// use ews_config::Config;
///
/// # fn main() -> Result<(), ews_client::telemetry::TelemetryError> {
/// let config = Config::default();
/// telemetry::initialise(&config)?;
/// telemetry::initialise(&config)?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] for a bad filter, or
/// [`TelemetryError::AlreadyInstalled`] when a subscriber was set elsewhere.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| TelemetryHandle)
}

pub(crate) fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let subscriber = subscriber_for(config.log_format(), log_filter(config)?);
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::AlreadyInstalled)
}

pub(crate) fn log_filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::InvalidFilter {
        filter: config.log_filter().to_owned(),
        message: error.to_string(),
    })
}

fn subscriber_for(format: LogFormat, filter: EnvFilter) -> Box<dyn Subscriber + Send + Sync> {
    let colour = !format.is_machine_readable() && io::stderr().is_terminal();
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(colour)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    match format {
        LogFormat::Compact => Box::new(builder.compact().finish()),
        LogFormat::Pretty => Box::new(
            builder
                .pretty()
                .with_file(true)
                .with_line_number(true)
                .finish(),
        ),
        LogFormat::Json => Box::new(
            builder
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .finish(),
        ),
    }
}
