use crate::logging::LogFormat;

/// Protocol version assumed for the server when none is configured.
pub const DEFAULT_SERVER_VERSION: &str = "Exchange2013_SP1";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Seconds a request may wait for its reply.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 100;

/// Owned server version used where allocation is required (e.g. serde).
#[must_use]
pub fn default_server_version() -> String {
    DEFAULT_SERVER_VERSION.to_owned()
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format, readable in a terminal.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default request timeout in seconds.
#[must_use]
pub const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
