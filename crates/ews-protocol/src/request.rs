//! Contract every concrete protocol request implements.
//!
//! A request type fixes its element names, minimum protocol version, and
//! reply multiplicity; instances carry the parameter values. The
//! [`ServiceDispatcher`](crate::dispatch::ServiceDispatcher) owns every
//! protocol mechanic (version gating, envelope writing, reply scanning), so a
//! request only describes itself.

use crate::codec::DocumentWriter;
use crate::error::ProtocolError;
use crate::response::ResponsePayload;
use crate::version::ExchangeVersion;

/// How a fault in one response unit affects the rest of the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorHandling {
    /// Abort on the first unit reporting an error.
    #[default]
    ThrowOnError,
    /// Record faults on their units and return every unit.
    ReturnErrors,
}

/// A typed protocol operation.
pub trait ServiceRequest {
    /// Result payload populated from each successful response unit.
    type Payload: ResponsePayload;

    /// Element name of the request in the `m:` namespace.
    fn xml_element_name(&self) -> &'static str;

    /// Element name of the reply body in the `m:` namespace.
    fn response_xml_element_name(&self) -> &'static str;

    /// Element name of each response unit inside `m:ResponseMessages`.
    fn response_message_xml_element_name(&self) -> &'static str;

    /// Earliest protocol version that defines this request.
    fn minimum_required_version(&self) -> ExchangeVersion;

    /// Policy applied to response units reporting an error.
    fn error_handling(&self) -> ErrorHandling;

    /// Number of response units the reply must contain.
    fn expected_response_message_count(&self) -> usize;

    /// Creates the payload for the response unit at `index`, in document
    /// order.
    fn create_response_payload(&self, index: usize) -> Self::Payload;

    /// Writes attributes onto the request element.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::WriteFailed`] on writer failure.
    fn write_attributes(&self, writer: &mut DocumentWriter) -> Result<(), ProtocolError> {
        let _ = writer;
        Ok(())
    }

    /// Writes the child elements of the request element.
    ///
    /// # Errors
    ///
    /// Returns field or writer errors.
    fn write_elements(&self, writer: &mut DocumentWriter) -> Result<(), ProtocolError>;

    /// Checks the request's parameters before anything is written.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ValidationFailure`] describing the first
    /// problem.
    fn validate(&self) -> Result<(), ProtocolError> {
        Ok(())
    }
}
