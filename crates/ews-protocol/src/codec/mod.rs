//! Structured document codec over XML.
//!
//! The codec exposes a read cursor ([`DocumentReader`]) and a write cursor
//! ([`DocumentWriter`]) that every higher layer uses: patterns, settings
//! holders, requests, and responses never touch the underlying `quick-xml`
//! types directly. Inbound documents are tokenised eagerly into owned
//! [`XmlToken`]s so the cursor can skip, peek, and capture subtrees without
//! juggling borrow lifetimes.

mod reader;
mod writer;

#[cfg(test)]
mod tests;

pub use self::reader::{DocumentReader, NodeKind};
pub use self::writer::DocumentWriter;

/// Namespaces the protocol writes and recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XmlNamespace {
    /// SOAP 1.1 envelope namespace.
    Soap,
    /// Message (request/response) element namespace.
    Messages,
    /// Shared type namespace.
    Types,
    /// Root namespace of plain-old-XML autodiscover responses.
    Autodiscover,
    /// Outlook provider namespace inside an autodiscover response.
    OutlookResponse,
    /// XML schema instance namespace carrying `xsi:type` and `xsi:nil`.
    SchemaInstance,
}

impl XmlNamespace {
    /// Returns the prefix used when writing elements in this namespace.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Soap => "soap",
            Self::Messages => "m",
            Self::Types => "t",
            Self::Autodiscover => "a",
            Self::OutlookResponse => "o",
            Self::SchemaInstance => "xsi",
        }
    }

    /// Returns the namespace URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Soap => "http://schemas.xmlsoap.org/soap/envelope/",
            Self::Messages => "http://schemas.microsoft.com/exchange/services/2006/messages",
            Self::Types => "http://schemas.microsoft.com/exchange/services/2006/types",
            Self::Autodiscover => {
                "http://schemas.microsoft.com/exchange/autodiscover/responseschema/2006"
            }
            Self::OutlookResponse => {
                "http://schemas.microsoft.com/exchange/autodiscover/outlook/responseschema/2006a"
            }
            Self::SchemaInstance => "http://www.w3.org/2001/XMLSchema-instance",
        }
    }

    /// Looks up a known namespace by URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        [
            Self::Soap,
            Self::Messages,
            Self::Types,
            Self::Autodiscover,
            Self::OutlookResponse,
            Self::SchemaInstance,
        ]
        .into_iter()
        .find(|namespace| namespace.uri() == uri)
    }
}

/// A namespace-resolved element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlName {
    namespace: Option<String>,
    local_name: String,
}

impl XmlName {
    /// Creates a name from an optional namespace URI and a local name.
    #[must_use]
    pub fn new(namespace: Option<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace,
            local_name: local_name.into(),
        }
    }

    /// Creates a name in one of the known namespaces.
    #[must_use]
    pub fn qualified(namespace: XmlNamespace, local_name: impl Into<String>) -> Self {
        Self::new(Some(namespace.uri().to_owned()), local_name)
    }

    /// Returns the namespace URI, if the element was bound to one.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the local part of the name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Returns `true` when this name matches the given namespace and local name.
    #[must_use]
    pub fn is(&self, namespace: XmlNamespace, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace() == Some(namespace.uri())
    }
}

/// One node of a tokenised document.
///
/// Empty elements are expanded into a `Start` immediately followed by an
/// `End`, and whitespace-only text is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlToken {
    /// Opening tag.
    Start {
        /// Element name.
        name: XmlName,
        /// Attributes as `(resolved name, unescaped value)` pairs, excluding
        /// namespace declarations. Unprefixed attributes have no namespace.
        attributes: Vec<(XmlName, String)>,
    },
    /// Closing tag.
    End {
        /// Element name.
        name: XmlName,
    },
    /// Unescaped character data.
    Text(String),
}

impl XmlToken {
    /// Creates an opening tag without attributes.
    #[must_use]
    pub const fn start(name: XmlName) -> Self {
        Self::Start {
            name,
            attributes: Vec::new(),
        }
    }

    /// Creates a closing tag.
    #[must_use]
    pub const fn end(name: XmlName) -> Self {
        Self::End { name }
    }

    /// Creates a text node.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns the element name for `Start` and `End` tokens.
    #[must_use]
    pub const fn name(&self) -> Option<&XmlName> {
        match self {
            Self::Start { name, .. } | Self::End { name } => Some(name),
            Self::Text(_) => None,
        }
    }
}
