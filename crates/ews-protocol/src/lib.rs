//! Typed marshalling core for EWS-style SOAP messaging.
//!
//! The `ews-protocol` crate binds an in-memory object model to wire documents.
//! It owns three pieces of machinery that every operation in the protocol
//! reuses:
//!
//! - a versioned request/response engine ([`ServiceRequest`],
//!   [`ServiceDispatcher`]) that gates requests on the negotiated protocol
//!   version, writes the SOAP envelope, and scans replies for response units
//!   under a per-request error policy;
//! - an open family of recurrence patterns ([`pattern`]) that layer required
//!   fields over a common base and encode identically to XML and to the
//!   legacy JSON form;
//! - a lazily built settings-converter registry ([`settings`]) answering
//!   which requested user settings an autodiscover reply can supply.
//!
//! Required fields are stored in [`property::RequiredValue`], which separates
//! reading an unset field, assigning an out-of-range value, and finding a
//! field unset at validation into three distinct [`ProtocolError`] variants.
//!
//! # Example
//!
//! ```rust
//! use ews_protocol::requests::{DeleteItemRequest, ItemId};
//! use ews_protocol::{
//!     ErrorHandling, ExchangeVersion, OutboundDocument, ProtocolError, ServiceDispatcher,
//!     ServiceResult, Transport,
//! };
//!
//! struct Loopback;
//!
//! impl Transport for Loopback {
//!     fn send(&self, _document: &OutboundDocument) -> Result<String, ProtocolError> {
//!         Ok(String::from(concat!(
//!             r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>"#,
//!             r#"<m:DeleteItemResponse xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages">"#,
//!             r#"<m:ResponseMessages><m:DeleteItemResponseMessage ResponseClass="Success"/>"#,
//!             r#"</m:ResponseMessages></m:DeleteItemResponse></s:Body></s:Envelope>"#,
//!         )))
//!     }
//! }
//!
//! let dispatcher = ServiceDispatcher::new(Loopback, ExchangeVersion::Exchange2013);
//! let request = DeleteItemRequest::new(vec![ItemId::new("AAMk")], ErrorHandling::ThrowOnError);
//! let responses = dispatcher.execute(&request)?;
//! assert_eq!(responses.overall_result(), ServiceResult::Success);
//! # Ok::<(), ProtocolError>(())
//! ```

pub mod codec;
pub mod dispatch;
pub mod error;
pub mod legacy;
pub mod pattern;
pub mod property;
pub mod request;
pub mod requests;
pub mod response;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod version;

#[cfg(test)]
mod tests;

pub use self::dispatch::{OutboundDocument, ServiceDispatcher, Transport};
pub use self::error::{ProtocolError, ProtocolErrorKind, ServiceFault};
pub use self::request::{ErrorHandling, ServiceRequest};
pub use self::response::{
    ResponsePayload, ServiceResponse, ServiceResponseCollection, ServiceResult,
};
pub use self::version::{ExchangeVersion, ParseVersionError};
