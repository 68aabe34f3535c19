use crate::codec::{DocumentReader, DocumentWriter, NodeKind, XmlNamespace, XmlToken};
use crate::error::ProtocolError;
use crate::property::RequiredValue;
use crate::request::{ErrorHandling, ServiceRequest};
use crate::response::ResponsePayload;
use crate::version::ExchangeVersion;

const VERB: &str = "Verb";
const PARAMETER: &str = "Parameter";
const RETURN_VALUE: &str = "ReturnValue";

/// Runs a named diagnostic method on the server with an XML argument.
///
/// # Example
///
/// ```
/// use ews_protocol::requests::ExecuteDiagnosticMethodRequest;
///
/// let mut request = ExecuteDiagnosticMethodRequest::new();
/// request.set_verb("GetExchangeDiagnosticInfo");
/// request.set_parameter_xml("<Process><Name>w3wp</Name></Process>")?;
/// # Ok::<(), ews_protocol::ProtocolError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteDiagnosticMethodRequest {
    verb: RequiredValue<String>,
    parameter: RequiredValue<Vec<XmlToken>>,
}

impl ExecuteDiagnosticMethodRequest {
    /// Creates a request with neither verb nor parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            verb: RequiredValue::unset(VERB),
            parameter: RequiredValue::unset(PARAMETER),
        }
    }

    /// Returns the diagnostic verb.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UninitializedField`] if it was never set.
    pub fn verb(&self) -> Result<&str, ProtocolError> {
        self.verb.get().map(String::as_str)
    }

    /// Sets the diagnostic verb.
    pub fn set_verb(&mut self, verb: impl Into<String>) {
        self.verb.set(verb.into());
    }

    /// Returns the parameter node as captured tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UninitializedField`] if it was never set.
    pub fn parameter(&self) -> Result<&[XmlToken], ProtocolError> {
        self.parameter.get().map(Vec::as_slice)
    }

    /// Sets the parameter node from tokens.
    pub fn set_parameter(&mut self, tokens: Vec<XmlToken>) {
        self.parameter.set(tokens);
    }

    /// Sets the parameter node from XML text holding a single root element.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedDocument`] when the text does not
    /// parse or holds no element.
    pub fn set_parameter_xml(&mut self, xml: &str) -> Result<(), ProtocolError> {
        let mut reader = DocumentReader::parse(xml)?;
        if reader.advance() != NodeKind::StartElement {
            return Err(ProtocolError::malformed(
                "diagnostic parameter must contain an element",
            ));
        }
        self.parameter.set(reader.read_outer_tokens()?);
        Ok(())
    }
}

impl Default for ExecuteDiagnosticMethodRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceRequest for ExecuteDiagnosticMethodRequest {
    type Payload = DiagnosticResult;

    fn xml_element_name(&self) -> &'static str {
        "ExecuteDiagnosticMethod"
    }

    fn response_xml_element_name(&self) -> &'static str {
        "ExecuteDiagnosticMethodResponse"
    }

    fn response_message_xml_element_name(&self) -> &'static str {
        "ExecuteDiagnosticMethodResponseMessage"
    }

    fn minimum_required_version(&self) -> ExchangeVersion {
        ExchangeVersion::Exchange2010Sp2
    }

    fn error_handling(&self) -> ErrorHandling {
        ErrorHandling::ThrowOnError
    }

    fn expected_response_message_count(&self) -> usize {
        1
    }

    fn create_response_payload(&self, _index: usize) -> DiagnosticResult {
        DiagnosticResult::default()
    }

    fn write_elements(&self, writer: &mut DocumentWriter) -> Result<(), ProtocolError> {
        writer.write_element_value(XmlNamespace::Messages, VERB, self.verb()?)?;
        writer.write_start_element(XmlNamespace::Messages, PARAMETER)?;
        writer.write_tokens(self.parameter()?)?;
        writer.write_end_element()
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        self.verb.require()?;
        self.parameter.require()?;
        if self.verb()?.trim().is_empty() {
            return Err(ProtocolError::validation("Verb must not be empty"));
        }
        Ok(())
    }
}

/// XML node returned by a diagnostic method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticResult {
    return_value: Vec<XmlToken>,
}

impl DiagnosticResult {
    /// Returns the tokens inside `m:ReturnValue`.
    #[must_use]
    pub fn return_value(&self) -> &[XmlToken] {
        &self.return_value
    }

    /// Re-serialises the returned node as XML text.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::WriteFailed`] if the tokens are unbalanced.
    pub fn to_xml(&self) -> Result<String, ProtocolError> {
        let mut writer = DocumentWriter::new();
        writer.write_tokens(&self.return_value)?;
        writer.into_document()
    }
}

impl ResponsePayload for DiagnosticResult {
    fn read_element_from_xml(&mut self, reader: &mut DocumentReader) -> Result<bool, ProtocolError> {
        if !reader.is_start_element(XmlNamespace::Messages, RETURN_VALUE) {
            return Ok(false);
        }
        self.return_value = reader.read_inner_tokens()?;
        Ok(true)
    }
}
