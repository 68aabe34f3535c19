use std::sync::Arc;

use ews_protocol::{ParseVersionError, ProtocolError};
use ortho_config::OrthoError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Errors surfaced by the client facade.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The configured server version names no known protocol version.
    #[error("configured server version is not recognised: {source}")]
    UnknownServerVersion {
        /// Parse failure naming the rejected text.
        #[source]
        source: ParseVersionError,
    },
    /// A protocol operation failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
