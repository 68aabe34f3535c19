//! Response units and the collection returned by a dispatch.


use strum::{Display, EnumString};

use crate::codec::{DocumentReader, NodeKind, XmlNamespace};
use crate::error::{ProtocolError, ServiceFault};

const RESPONSE_CLASS: &str = "ResponseClass";

/// Request-specific result data read from a response unit.
pub trait ResponsePayload {
    /// Offers one child element of the response unit. Returns `true` when the
    /// element was consumed; unrecognised elements are skipped by the caller.
    ///
    /// # Errors
    ///
    /// Returns parse errors for elements the payload recognised but could not
    /// read.
    fn read_element_from_xml(&mut self, reader: &mut DocumentReader) -> Result<bool, ProtocolError>;
}

impl ResponsePayload for () {
    fn read_element_from_xml(&mut self, _reader: &mut DocumentReader) -> Result<bool, ProtocolError> {
        Ok(false)
    }
}

/// Outcome status of a response unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString)]
pub enum ServiceResult {
    /// The operation succeeded.
    Success,
    /// The operation succeeded with a warning.
    Warning,
    /// The operation failed.
    Error,
}

/// One result unit of a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse<P> {
    result: ServiceResult,
    payload: P,
    fault: Option<ServiceFault>,
}

impl<P: ResponsePayload> ServiceResponse<P> {
    /// Reads the response unit under the cursor into `payload`, leaving the
    /// cursor on the unit's closing tag.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedDocument`] when the unit lacks a
    /// valid `ResponseClass` or is never closed, or any payload error.
    pub fn load_from_xml(reader: &mut DocumentReader, mut payload: P) -> Result<Self, ProtocolError> {
        let element = reader.local_name()?.to_owned();
        let class = reader.attribute(RESPONSE_CLASS).ok_or_else(|| {
            ProtocolError::malformed(format!("'{element}' has no {RESPONSE_CLASS} attribute"))
        })?;
        let result: ServiceResult = class
            .parse()
            .map_err(|_| ProtocolError::invalid_value(RESPONSE_CLASS, class))?;

        let mut code = None;
        let mut message = None;
        let mut link_key = None;
        let mut details = Vec::new();
        loop {
            match reader.advance() {
                NodeKind::StartElement if reader.is_in_namespace(XmlNamespace::Messages) => {
                    let name = reader.local_name()?.to_owned();
                    match name.as_str() {
                        "MessageText" => message = Some(reader.read_element_text()?),
                        "ResponseCode" => {
                            code = Some(reader.read_element_text()?.trim().to_owned());
                        }
                        "DescriptiveLinkKey" => link_key = Some(reader.read_element_value()?),
                        "MessageXml" => details = reader.read_inner_tokens()?,
                        _ => {
                            if !payload.read_element_from_xml(reader)? {
                                reader.skip_current_element()?;
                            }
                        }
                    }
                }
                NodeKind::StartElement => {
                    if !payload.read_element_from_xml(reader)? {
                        reader.skip_current_element()?;
                    }
                }
                NodeKind::EndElement if reader.is_end_element(XmlNamespace::Messages, &element) => {
                    break;
                }
                NodeKind::EndOfDocument => {
                    return Err(ProtocolError::malformed(format!(
                        "element '{element}' is never closed"
                    )));
                }
                NodeKind::EndElement | NodeKind::Text => {}
            }
        }

        let fault = (result != ServiceResult::Success).then(|| {
            let fault = ServiceFault::new(code.unwrap_or_default(), message.unwrap_or_default())
                .with_details(details);
            match link_key {
                Some(key) => fault.with_descriptive_link_key(key),
                None => fault,
            }
        });
        Ok(Self {
            result,
            payload,
            fault,
        })
    }
}

impl<P> ServiceResponse<P> {
    /// Returns the outcome status.
    #[must_use]
    pub const fn result(&self) -> ServiceResult {
        self.result
    }

    /// Returns `true` for a successful unit.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result == ServiceResult::Success
    }

    /// Returns the payload. For an error unit it holds whatever the service
    /// returned alongside the fault, usually nothing.
    #[must_use]
    pub const fn payload(&self) -> &P {
        &self.payload
    }

    /// Consumes the unit, returning its payload.
    #[must_use]
    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Returns the fault detail of a warning or error unit.
    #[must_use]
    pub const fn fault(&self) -> Option<&ServiceFault> {
        self.fault.as_ref()
    }
}

/// Every response unit of one reply, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponseCollection<P> {
    responses: Vec<ServiceResponse<P>>,
}

impl<P> ServiceResponseCollection<P> {
    pub(crate) const fn new(responses: Vec<ServiceResponse<P>>) -> Self {
        Self { responses }
    }

    /// Returns the number of units.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.responses.len()
    }

    /// Returns `true` when there are no units.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Returns the unit at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ServiceResponse<P>> {
        self.responses.get(index)
    }

    /// Iterates over the units.
    pub fn iter(&self) -> std::slice::Iter<'_, ServiceResponse<P>> {
        self.responses.iter()
    }

    /// Consumes the collection, returning its units.
    #[must_use]
    pub fn into_vec(self) -> Vec<ServiceResponse<P>> {
        self.responses
    }

    /// Returns the worst status of any unit: `Error` if one failed, else
    /// `Warning` if one warned, else `Success`.
    #[must_use]
    pub fn overall_result(&self) -> ServiceResult {
        self.responses
            .iter()
            .map(ServiceResponse::result)
            .max()
            .unwrap_or(ServiceResult::Success)
    }
}

impl<P> IntoIterator for ServiceResponseCollection<P> {
    type Item = ServiceResponse<P>;
    type IntoIter = std::vec::IntoIter<ServiceResponse<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.into_iter()
    }
}

impl<'a, P> IntoIterator for &'a ServiceResponseCollection<P> {
    type Item = &'a ServiceResponse<P>;
    type IntoIter = std::slice::Iter<'a, ServiceResponse<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.iter()
    }
}
