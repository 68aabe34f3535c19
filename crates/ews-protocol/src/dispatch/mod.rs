//! Request dispatch: version gating, envelope writing, and reply scanning.
//!
//! [`ServiceDispatcher`] drives one synchronous exchange per call. It checks
//! the request's minimum version against the negotiated version before
//! anything is written, serialises a fresh SOAP envelope, hands it to a
//! [`Transport`], and scans the reply for response units, applying the
//! request's error-handling policy as it goes.


use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::codec::{DocumentReader, DocumentWriter, NodeKind, XmlNamespace};
use crate::error::{ProtocolError, ServiceFault};
use crate::request::{ErrorHandling, ServiceRequest};
use crate::response::{ServiceResponse, ServiceResponseCollection, ServiceResult};
use crate::version::ExchangeVersion;

const DISPATCH_TARGET: &str = "ews_protocol::dispatch";

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// A serialised request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundDocument {
    request_name: &'static str,
    body: String,
    timeout: Duration,
}

impl OutboundDocument {
    /// Wraps a serialised request.
    #[must_use]
    pub const fn new(request_name: &'static str, body: String, timeout: Duration) -> Self {
        Self {
            request_name,
            body,
            timeout,
        }
    }

    /// Element name of the request, for error reporting.
    #[must_use]
    pub const fn request_name(&self) -> &'static str {
        self.request_name
    }

    /// Document text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// How long the transport may wait for the reply.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Delivers outbound documents and returns the reply text.
///
/// Implementations report network failures as [`ProtocolError::Transport`],
/// expired deadlines as [`ProtocolError::Timeout`], and cancellation as
/// [`ProtocolError::Cancelled`].
pub trait Transport {
    /// Sends one document and blocks until the reply is available.
    ///
    /// # Errors
    ///
    /// Returns a transport, timeout, or cancellation error.
    fn send(&self, document: &OutboundDocument) -> Result<String, ProtocolError>;
}

/// Executes requests against a service speaking a fixed protocol version.
#[derive(Debug)]
pub struct ServiceDispatcher<T> {
    transport: T,
    version: ExchangeVersion,
    timeout: Duration,
    trace_documents: bool,
}

impl<T: Transport> ServiceDispatcher<T> {
    /// Creates a dispatcher for a service speaking `version`.
    #[must_use]
    pub const fn new(transport: T, version: ExchangeVersion) -> Self {
        Self {
            transport,
            version,
            timeout: DEFAULT_TIMEOUT,
            trace_documents: false,
        }
    }

    /// Sets the reply timeout handed to the transport.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables logging of whole documents at `trace` level.
    #[must_use]
    pub const fn with_document_tracing(mut self, enabled: bool) -> Self {
        self.trace_documents = enabled;
        self
    }

    /// Returns the negotiated protocol version.
    #[must_use]
    pub const fn version(&self) -> ExchangeVersion {
        self.version
    }

    /// Returns the reply timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs one request/response exchange.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::VersionIncompatible`] before anything is written
    ///   when the service is too old for the request.
    /// - [`ProtocolError::ValidationFailure`] when the request rejects its own
    ///   parameters.
    /// - Transport, timeout, or cancellation errors from the transport.
    /// - [`ProtocolError::SoapFault`] when the reply body is a SOAP fault.
    /// - [`ProtocolError::ServiceFault`] for the first error unit under
    ///   [`ErrorHandling::ThrowOnError`].
    /// - [`ProtocolError::ProtocolShape`] when the reply lacks the expected
    ///   elements or holds the wrong number of units.
    pub fn execute<R: ServiceRequest>(
        &self,
        request: &R,
    ) -> Result<ServiceResponseCollection<R::Payload>, ProtocolError> {
        let name = request.xml_element_name();
        self.check_version(request)?;
        request.validate()?;

        let body = self.write_request(request)?;
        debug!(
            target: DISPATCH_TARGET,
            request = name,
            version = %self.version,
            bytes = body.len(),
            "sending request"
        );
        if self.trace_documents {
            trace!(target: DISPATCH_TARGET, request = name, document = %body, "outbound document");
        }

        let reply = self
            .transport
            .send(&OutboundDocument::new(name, body, self.timeout))?;
        if self.trace_documents {
            trace!(target: DISPATCH_TARGET, request = name, document = %reply, "inbound document");
        }
        self.read_response(request, &reply)
    }

    /// Fails with [`ProtocolError::VersionIncompatible`] when the negotiated
    /// version predates the request.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn check_version<R: ServiceRequest>(&self, request: &R) -> Result<(), ProtocolError> {
        let required = request.minimum_required_version();
        if self.version.supports(required) {
            return Ok(());
        }
        warn!(
            target: DISPATCH_TARGET,
            request = request.xml_element_name(),
            %required,
            live = %self.version,
            "request not supported by service version"
        );
        Err(ProtocolError::VersionIncompatible {
            request: request.xml_element_name(),
            required,
            live: self.version,
        })
    }

    /// Serialises `request` inside a SOAP envelope stamped with the
    /// negotiated version.
    ///
    /// # Errors
    ///
    /// Returns field or writer errors from the request.
    pub fn write_request<R: ServiceRequest>(&self, request: &R) -> Result<String, ProtocolError> {
        let mut writer = DocumentWriter::new();
        writer.write_start_element(XmlNamespace::Soap, "Envelope")?;
        for namespace in [XmlNamespace::Soap, XmlNamespace::Messages, XmlNamespace::Types] {
            writer.write_namespace_declaration(namespace)?;
        }

        writer.write_start_element(XmlNamespace::Soap, "Header")?;
        writer.write_start_element(XmlNamespace::Types, "RequestServerVersion")?;
        writer.write_attribute("Version", self.version)?;
        writer.write_end_element()?;
        writer.write_end_element()?;

        writer.write_start_element(XmlNamespace::Soap, "Body")?;
        writer.write_start_element(XmlNamespace::Messages, request.xml_element_name())?;
        request.write_attributes(&mut writer)?;
        request.write_elements(&mut writer)?;
        writer.write_end_element()?;
        writer.write_end_element()?;

        writer.write_end_element()?;
        writer.into_document()
    }

    fn read_response<R: ServiceRequest>(
        &self,
        request: &R,
        reply: &str,
    ) -> Result<ServiceResponseCollection<R::Payload>, ProtocolError> {
        let name = request.xml_element_name();
        let mut reader = DocumentReader::parse(reply)?;
        if !reader.read_to_descendant(XmlNamespace::Soap, "Body")? {
            return Err(ProtocolError::shape(name, "reply has no SOAP body"));
        }

        loop {
            match reader.advance() {
                NodeKind::StartElement if reader.is_start_element(XmlNamespace::Soap, "Fault") => {
                    return Err(read_soap_fault(&mut reader)?);
                }
                NodeKind::StartElement
                    if reader.is_start_element(
                        XmlNamespace::Messages,
                        request.response_xml_element_name(),
                    ) =>
                {
                    break;
                }
                NodeKind::StartElement => reader.skip_current_element()?,
                NodeKind::EndElement | NodeKind::EndOfDocument => {
                    return Err(ProtocolError::shape(
                        name,
                        format!(
                            "reply body has no {} element",
                            request.response_xml_element_name()
                        ),
                    ));
                }
                NodeKind::Text => {}
            }
        }

        if !reader.read_to_descendant(XmlNamespace::Messages, "ResponseMessages")? {
            return Err(ProtocolError::shape(
                name,
                "reply has no ResponseMessages element",
            ));
        }
        self.read_units(request, &mut reader)
    }

    fn read_units<R: ServiceRequest>(
        &self,
        request: &R,
        reader: &mut DocumentReader,
    ) -> Result<ServiceResponseCollection<R::Payload>, ProtocolError> {
        let name = request.xml_element_name();
        let unit_name = request.response_message_xml_element_name();
        let expected = request.expected_response_message_count();
        let policy = request.error_handling();
        let mut responses = Vec::with_capacity(expected);

        loop {
            match reader.advance() {
                NodeKind::StartElement if reader.is_start_element(XmlNamespace::Messages, unit_name) => {
                    let index = responses.len();
                    if index >= expected {
                        return Err(count_mismatch(name, expected, "more"));
                    }
                    let response =
                        ServiceResponse::load_from_xml(reader, request.create_response_payload(index))?;
                    debug!(
                        target: DISPATCH_TARGET,
                        request = name,
                        index,
                        result = %response.result(),
                        "read response unit"
                    );
                    if response.result() == ServiceResult::Error
                        && policy == ErrorHandling::ThrowOnError
                    {
                        let fault = response.fault().cloned().unwrap_or_else(|| {
                            ServiceFault::new(String::new(), String::new())
                        });
                        warn!(
                            target: DISPATCH_TARGET,
                            request = name,
                            index,
                            code = fault.code(),
                            "aborting on failed response unit"
                        );
                        return Err(ProtocolError::ServiceFault {
                            index,
                            fault: Box::new(fault),
                        });
                    }
                    responses.push(response);
                }
                NodeKind::StartElement => reader.skip_current_element()?,
                NodeKind::EndElement
                    if reader.is_end_element(XmlNamespace::Messages, "ResponseMessages") =>
                {
                    break;
                }
                NodeKind::EndOfDocument => {
                    return Err(ProtocolError::malformed(
                        "element 'ResponseMessages' is never closed",
                    ));
                }
                NodeKind::EndElement | NodeKind::Text => {}
            }
        }

        if responses.len() != expected {
            return Err(count_mismatch(name, expected, "fewer"));
        }
        Ok(ServiceResponseCollection::new(responses))
    }
}

fn count_mismatch(request: &'static str, expected: usize, direction: &str) -> ProtocolError {
    ProtocolError::shape(
        request,
        format!("reply holds {direction} than the {expected} response message(s) expected"),
    )
}

fn read_soap_fault(reader: &mut DocumentReader) -> Result<ProtocolError, ProtocolError> {
    let mut code = String::new();
    let mut message = String::new();
    loop {
        match reader.advance() {
            NodeKind::StartElement => {
                let name = reader.local_name()?.to_owned();
                match name.as_str() {
                    "faultcode" => code = reader.read_element_text()?.trim().to_owned(),
                    "faultstring" => message = reader.read_element_text()?,
                    _ => reader.skip_current_element()?,
                }
            }
            NodeKind::EndElement if reader.is_end_element(XmlNamespace::Soap, "Fault") => {
                return Ok(ProtocolError::SoapFault { code, message });
            }
            NodeKind::EndOfDocument => {
                return Err(ProtocolError::malformed("element 'Fault' is never closed"));
            }
            NodeKind::EndElement | NodeKind::Text => {}
        }
    }
}
