//! Layered configuration for the EWS client.
//!
//! Values resolve from built-in defaults, then an `ews.toml` file named by
//! `--config-path` or `EWS_CONFIG_PATH`, then `EWS_*` environment variables,
//! then command-line flags. Later layers win.

mod defaults;
mod logging;

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use self::defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVER_VERSION, default_log_filter,
    default_log_format, default_request_timeout_secs, default_server_version,
};
pub use self::logging::{LogFormat, LogFormatParseError};

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "EWS")]
pub struct Config {
    /// Protocol version negotiated with the server, e.g. `Exchange2010_SP2`.
    #[serde(default = "default_server_version")]
    #[ortho_config(default = default_server_version())]
    server_version: String,
    /// Tracing filter expression.
    #[serde(default = "default_log_filter")]
    #[ortho_config(default = default_log_filter())]
    log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    log_format: LogFormat,
    /// Seconds a request may wait for its reply.
    #[serde(default = "default_request_timeout_secs")]
    #[ortho_config(default = default_request_timeout_secs())]
    request_timeout_secs: u64,
    /// Logs every outbound and inbound document at `trace` level.
    #[serde(default)]
    #[ortho_config(default = false)]
    trace_documents: bool,
}

impl Config {
    /// Returns the configured server version name.
    #[must_use]
    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    /// Returns the tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the per-request reply timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reports whether wire documents are traced.
    #[must_use]
    pub const fn trace_documents(&self) -> bool {
        self.trace_documents
    }

    /// Returns a copy pointing at a different server version.
    #[must_use]
    pub fn with_server_version(mut self, version: impl Into<String>) -> Self {
        self.server_version = version.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_version: default_server_version(),
            log_filter: default_log_filter(),
            log_format: default_log_format(),
            request_timeout_secs: default_request_timeout_secs(),
            trace_documents: false,
        }
    }
}
