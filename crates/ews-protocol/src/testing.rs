//! Test doubles shared by this crate's tests and downstream crates.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::dispatch::{OutboundDocument, Transport};
use crate::error::ProtocolError;

/// Transport replaying canned replies in order and recording every document
/// it was asked to send.
#[derive(Debug, Default)]
pub struct CannedTransport {
    replies: Mutex<VecDeque<Result<String, ProtocolError>>>,
    sent: Mutex<Vec<OutboundDocument>>,
}

impl CannedTransport {
    /// Creates a transport with no replies queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply document.
    #[must_use]
    pub fn with_reply(self, document: impl Into<String>) -> Self {
        self.push(Ok(document.into()));
        self
    }

    /// Queues a transport failure.
    #[must_use]
    pub fn with_failure(self, error: ProtocolError) -> Self {
        self.push(Err(error));
        self
    }

    /// Returns a copy of every document sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<OutboundDocument> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, reply: Result<String, ProtocolError>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }
}

impl Transport for CannedTransport {
    fn send(&self, document: &OutboundDocument) -> Result<String, ProtocolError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(document.clone());
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(ProtocolError::Transport {
                    request: document.request_name(),
                    message: String::from("no canned reply queued"),
                    source: None,
                })
            })
    }
}

/// Wraps response units in a SOAP reply for `response_element`.
#[must_use]
pub fn soap_reply(response_element: &str, units: &[&str]) -> String {
    format!(
        concat!(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">"#,
            r#"<s:Body><m:{name} xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages" "#,
            r#"xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">"#,
            r#"<m:ResponseMessages>{units}</m:ResponseMessages></m:{name}></s:Body></s:Envelope>"#
        ),
        name = response_element,
        units = units.concat(),
    )
}
