//! Domain errors raised while marshalling and dispatching protocol messages.
//!
//! All errors use a single `thiserror`-derived enum with structured context so
//! callers can inspect the failure programmatically. Library errors from the
//! XML and transport layers are flattened to messages or wrapped in `Arc` to
//! keep the enum `Send + Sync` and small enough for the `result_large_err`
//! Clippy lint.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::codec::XmlToken;
use crate::version::ExchangeVersion;

/// Boxed error type accepted from transport implementations.
pub type TransportSource = Arc<dyn std::error::Error + Send + Sync>;

/// Errors arising from marshalling, validation, and dispatch.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A required field was read before it was ever assigned.
    #[error("field '{field}' has not been initialised")]
    UninitializedField {
        /// Wire name of the field.
        field: &'static str,
    },

    /// A setter received a value outside the field's declared domain.
    #[error("value {value} for '{field}' is outside the range {min}..={max}")]
    RangeViolation {
        /// Wire name of the field.
        field: &'static str,
        /// Rejected value, rendered as text.
        value: String,
        /// Inclusive lower bound.
        min: String,
        /// Inclusive upper bound.
        max: String,
    },

    /// Scalar text could not be parsed as the field's type.
    #[error("'{value}' is not a valid value for '{field}'")]
    InvalidFieldValue {
        /// Wire name of the field.
        field: String,
        /// Offending text.
        value: String,
    },

    /// An object failed its completeness check.
    #[error("validation failed: {message}")]
    ValidationFailure {
        /// Description of the missing or inconsistent data.
        message: String,
    },

    /// The request needs a newer protocol version than the live service.
    #[error("{request} requires {required} or later, but the service speaks {live}")]
    VersionIncompatible {
        /// Request element name.
        request: &'static str,
        /// Minimum version declared by the request type.
        required: ExchangeVersion,
        /// Negotiated version of the live service.
        live: ExchangeVersion,
    },

    /// The reply document does not have the shape the request declared.
    #[error("unexpected reply shape for {request}: {message}")]
    ProtocolShape {
        /// Request element name.
        request: &'static str,
        /// Description of the mismatch.
        message: String,
    },

    /// A response unit reported an error status.
    #[error("response unit {index} failed with {}: {}", .fault.code(), .fault.message())]
    ServiceFault {
        /// Zero-based position of the failing unit.
        index: usize,
        /// Fault detail supplied by the service.
        fault: Box<ServiceFault>,
    },

    /// The service replied with a SOAP fault instead of a response body.
    #[error("SOAP fault {code}: {message}")]
    SoapFault {
        /// `faultcode` element text.
        code: String,
        /// `faultstring` element text.
        message: String,
    },

    /// The document could not be tokenised or was structurally invalid.
    #[error("malformed document: {message}")]
    MalformedDocument {
        /// Description of the parse failure.
        message: String,
    },

    /// The outbound document could not be written.
    #[error("failed to write document: {message}")]
    WriteFailed {
        /// Description of the writer failure.
        message: String,
    },

    /// The transport failed to deliver the request or obtain a reply.
    #[error("transport failure for {request}: {message}")]
    Transport {
        /// Request element name.
        request: &'static str,
        /// Human-readable failure description.
        message: String,
        /// Optional underlying error from the transport.
        #[source]
        source: Option<TransportSource>,
    },

    /// The transport gave up waiting for the reply.
    #[error("{request} timed out after {timeout_secs}s")]
    Timeout {
        /// Request element name.
        request: &'static str,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },

    /// The exchange was cancelled before a reply was received.
    #[error("{request} was cancelled")]
    Cancelled {
        /// Request element name.
        request: &'static str,
    },
}

/// Coarse classification of a [`ProtocolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolErrorKind {
    /// See [`ProtocolError::UninitializedField`].
    UninitializedField,
    /// See [`ProtocolError::RangeViolation`].
    RangeViolation,
    /// See [`ProtocolError::InvalidFieldValue`].
    InvalidFieldValue,
    /// See [`ProtocolError::ValidationFailure`].
    ValidationFailure,
    /// See [`ProtocolError::VersionIncompatible`].
    VersionIncompatible,
    /// See [`ProtocolError::ProtocolShape`].
    ProtocolShape,
    /// See [`ProtocolError::ServiceFault`].
    ServiceFault,
    /// See [`ProtocolError::SoapFault`].
    SoapFault,
    /// See [`ProtocolError::MalformedDocument`].
    MalformedDocument,
    /// See [`ProtocolError::WriteFailed`].
    WriteFailed,
    /// See [`ProtocolError::Transport`].
    Transport,
    /// See [`ProtocolError::Timeout`].
    Timeout,
    /// See [`ProtocolError::Cancelled`].
    Cancelled,
}

impl ProtocolError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ProtocolErrorKind {
        match self {
            Self::UninitializedField { .. } => ProtocolErrorKind::UninitializedField,
            Self::RangeViolation { .. } => ProtocolErrorKind::RangeViolation,
            Self::InvalidFieldValue { .. } => ProtocolErrorKind::InvalidFieldValue,
            Self::ValidationFailure { .. } => ProtocolErrorKind::ValidationFailure,
            Self::VersionIncompatible { .. } => ProtocolErrorKind::VersionIncompatible,
            Self::ProtocolShape { .. } => ProtocolErrorKind::ProtocolShape,
            Self::ServiceFault { .. } => ProtocolErrorKind::ServiceFault,
            Self::SoapFault { .. } => ProtocolErrorKind::SoapFault,
            Self::MalformedDocument { .. } => ProtocolErrorKind::MalformedDocument,
            Self::WriteFailed { .. } => ProtocolErrorKind::WriteFailed,
            Self::Transport { .. } => ProtocolErrorKind::Transport,
            Self::Timeout { .. } => ProtocolErrorKind::Timeout,
            Self::Cancelled { .. } => ProtocolErrorKind::Cancelled,
        }
    }

    /// Creates a validation failure with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailure {
            message: message.into(),
        }
    }

    /// Creates a malformed-document error with the given message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: message.into(),
        }
    }

    /// Creates a reply-shape error for the named request.
    pub fn shape(request: &'static str, message: impl Into<String>) -> Self {
        Self::ProtocolShape {
            request,
            message: message.into(),
        }
    }

    /// Creates an invalid-value error for the named field.
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidFieldValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Converts a writer failure from the XML or time layer.
    pub(crate) fn write_failed(error: impl fmt::Display) -> Self {
        Self::WriteFailed {
            message: error.to_string(),
        }
    }

    /// Converts a tokeniser failure from the XML layer.
    pub(crate) fn parse_failed(error: impl fmt::Display) -> Self {
        Self::malformed(error.to_string())
    }
}

/// Error detail reported by a single response unit.
///
/// Faults are attached to their response unit under
/// [`ErrorHandling::ReturnErrors`](crate::request::ErrorHandling) and raised
/// as [`ProtocolError::ServiceFault`] under
/// [`ErrorHandling::ThrowOnError`](crate::request::ErrorHandling).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFault {
    code: String,
    message: String,
    descriptive_link_key: Option<i32>,
    details: Vec<XmlToken>,
}

impl ServiceFault {
    /// Creates a fault with the given response code and message text.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            descriptive_link_key: None,
            details: Vec::new(),
        }
    }

    /// Attaches the descriptive link key reported by the service.
    #[must_use]
    pub const fn with_descriptive_link_key(mut self, key: i32) -> Self {
        self.descriptive_link_key = Some(key);
        self
    }

    /// Attaches the raw `MessageXml` content reported by the service.
    #[must_use]
    pub fn with_details(mut self, details: Vec<XmlToken>) -> Self {
        self.details = details;
        self
    }

    /// Returns the protocol response code, for example `ErrorItemNotFound`.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the human-readable message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the descriptive link key, when the service supplied one.
    #[must_use]
    pub const fn descriptive_link_key(&self) -> Option<i32> {
        self.descriptive_link_key
    }

    /// Returns the raw `MessageXml` tokens.
    #[must_use]
    pub fn details(&self) -> &[XmlToken] {
        &self.details
    }
}
