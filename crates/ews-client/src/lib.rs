//! Client facade for EWS-style SOAP services.
//!
//! Resolves [`ews_config::Config`] into a [`ews_protocol::ServiceDispatcher`]
//! speaking the configured protocol version, installs structured telemetry,
//! and exposes the supported operations as typed methods on
//! [`ExchangeClient`]. The transport stays pluggable: anything implementing
//! [`ews_protocol::Transport`] can carry the documents.

mod client;
mod error;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use self::client::{ConfigLoader, ExchangeClient, SystemConfigLoader};
pub use self::error::ClientError;
pub use self::telemetry::{TelemetryError, TelemetryHandle};
