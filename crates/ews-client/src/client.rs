//! Typed operations over a configured dispatcher.

use std::sync::Arc;

use ews_config::Config;
use ews_protocol::requests::{
    DeleteItemRequest, DeleteMode, DiagnosticResult, ExecuteDiagnosticMethodRequest, ItemId,
};
use ews_protocol::settings::{
    OutlookUser, UserSettingName, UserSettingsReport, autodiscover_request,
};
use ews_protocol::{
    ErrorHandling, ExchangeVersion, OutboundDocument, ProtocolError, ServiceDispatcher,
    ServiceResponseCollection, Transport,
};
use ortho_config::{OrthoConfig, OrthoError};
use tracing::debug;

use crate::error::ClientError;
use crate::telemetry::{self, TelemetryHandle};

const CLIENT_TARGET: &str = "ews_client::client";
const AUTODISCOVER: &str = "Autodiscover";

/// Abstracts configuration loading so callers and tests can swap sources.
pub trait ConfigLoader {
    /// Loads the client configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader's aggregated error when any layer is unreadable.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that reads defaults, `ews.toml`, `EWS_*` variables and the
/// process arguments.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Client for one server, speaking the configured protocol version.
///
/// # Example
///
/// ```rust
/// use ews_client::ExchangeClient;
/// use ews_config::Config;
/// use ews_protocol::{OutboundDocument, ProtocolError, Transport};
///
/// struct Offline;
///
/// impl Transport for Offline {
///     fn send(&self, document: &OutboundDocument) -> Result<String, ProtocolError> {
///         Err(ProtocolError::Transport {
///             request: document.request_name(),
///             message: String::from("offline"),
///             source: None,
///         })
///     }
/// }
///
/// let config = Config::default().with_server_version("Exchange2010_SP2");
/// let client = ExchangeClient::from_config(&config, Offline)?;
/// assert_eq!(client.version().to_string(), "Exchange2010_SP2");
/// # Ok::<(), ews_client::ClientError>(())
/// ```
#[derive(Debug)]
pub struct ExchangeClient<T> {
    dispatcher: ServiceDispatcher<T>,
}

impl<T: Transport> ExchangeClient<T> {
    /// Builds a client from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownServerVersion`] when the configured
    /// version names no known protocol version.
    pub fn from_config(config: &Config, transport: T) -> Result<Self, ClientError> {
        let version: ExchangeVersion = config
            .server_version()
            .parse()
            .map_err(|source| ClientError::UnknownServerVersion { source })?;
        let dispatcher = ServiceDispatcher::new(transport, version)
            .with_timeout(config.request_timeout())
            .with_document_tracing(config.trace_documents());
        Ok(Self { dispatcher })
    }

    /// Loads configuration, installs telemetry, and builds a client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`], [`ClientError::Telemetry`] or
    /// [`ClientError::UnknownServerVersion`] for the step that failed.
    pub fn bootstrap(
        loader: &dyn ConfigLoader,
        transport: T,
    ) -> Result<(Self, TelemetryHandle), ClientError> {
        let config = loader
            .load()
            .map_err(|source| ClientError::Configuration { source })?;
        let handle = telemetry::initialise(&config)
            .map_err(|source| ClientError::Telemetry { source })?;
        let client = Self::from_config(&config, transport)?;
        debug!(
            target: CLIENT_TARGET,
            version = %client.version(),
            timeout_secs = client.dispatcher.timeout().as_secs(),
            "client ready"
        );
        Ok((client, handle))
    }

    /// Returns the negotiated protocol version.
    #[must_use]
    pub const fn version(&self) -> ExchangeVersion {
        self.dispatcher.version()
    }

    /// Returns the underlying dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &ServiceDispatcher<T> {
        &self.dispatcher
    }

    /// Runs a server-side diagnostic method and returns the node it produced.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Protocol`] when `parameter_xml` does not parse,
    /// the server is older than `Exchange2010_SP2`, or the call faults.
    pub fn execute_diagnostic_method(
        &self,
        verb: &str,
        parameter_xml: &str,
    ) -> Result<DiagnosticResult, ClientError> {
        let mut request = ExecuteDiagnosticMethodRequest::new();
        request.set_verb(verb);
        request.set_parameter_xml(parameter_xml)?;
        let responses = self.dispatcher.execute(&request)?;
        responses
            .into_vec()
            .into_iter()
            .next()
            .map(|unit| unit.into_payload())
            .ok_or_else(|| {
                ProtocolError::shape(
                    "ExecuteDiagnosticMethod",
                    "reply held no response message",
                )
                .into()
            })
    }

    /// Deletes items, returning one response unit per item in request order.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Protocol`] when validation or dispatch fails,
    /// or under [`ErrorHandling::ThrowOnError`] when any item faults.
    pub fn delete_items(
        &self,
        item_ids: Vec<ItemId>,
        mode: DeleteMode,
        error_handling: ErrorHandling,
    ) -> Result<ServiceResponseCollection<()>, ClientError> {
        let request = DeleteItemRequest::new(item_ids, error_handling).with_delete_mode(mode);
        Ok(self.dispatcher.execute(&request)?)
    }

    /// Asks autodiscover about `email_address` and reports the requested
    /// settings it could supply.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Protocol`] when the transport fails or the
    /// reply carries no user record.
    pub fn user_settings(
        &self,
        email_address: &str,
        requested: &[UserSettingName],
    ) -> Result<UserSettingsReport, ClientError> {
        let body = autodiscover_request(email_address)?;
        let document = OutboundDocument::new(AUTODISCOVER, body, self.dispatcher.timeout());
        let reply = self.dispatcher.transport().send(&document)?;
        let holder = OutlookUser::from_autodiscover_response(&reply)?;
        let report = UserSettingsReport::from_holder(&holder, requested);
        debug!(
            target: CLIENT_TARGET,
            requested = requested.len(),
            supplied = report.settings().len(),
            missing = report.errors().len(),
            "user settings resolved"
        );
        Ok(report)
    }
}
