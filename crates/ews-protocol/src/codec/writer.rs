//! Write cursor producing an outbound document.

use std::fmt::Display;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use super::{XmlName, XmlNamespace, XmlToken};
use crate::error::ProtocolError;

/// Namespace of the `xml` prefix, which is bound without a declaration.
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Write cursor over an in-memory XML document.
///
/// Opening tags are buffered until the next write so attributes can be added
/// after [`write_start_element`](Self::write_start_element), mirroring how
/// requests write their element name first and their attributes second. An
/// element closed straight after being opened is written in its empty form.
///
/// # Example
///
/// ```
/// use ews_protocol::codec::{DocumentWriter, XmlNamespace};
///
/// let mut writer = DocumentWriter::new();
/// writer.write_start_element(XmlNamespace::Types, "AbsoluteMonthlyRecurrence")?;
/// writer.write_namespace_declaration(XmlNamespace::Types)?;
/// writer.write_element_value(XmlNamespace::Types, "DayOfMonth", 15)?;
/// writer.write_end_element()?;
/// let xml = writer.into_document()?;
/// assert!(xml.contains("<t:DayOfMonth>15</t:DayOfMonth>"));
/// # Ok::<(), ews_protocol::ProtocolError>(())
/// ```
pub struct DocumentWriter {
    writer: Writer<Vec<u8>>,
    pending: Option<BytesStart<'static>>,
    open: Vec<OpenElement>,
}

/// An element awaiting its closing tag, with the namespaces it declares.
#[derive(Debug)]
struct OpenElement {
    name: String,
    prefixes: Vec<(String, String)>,
    default_namespace: Option<String>,
}

impl OpenElement {
    const fn new(name: String) -> Self {
        Self {
            name,
            prefixes: Vec::new(),
            default_namespace: None,
        }
    }
}

impl DocumentWriter {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            pending: None,
            open: Vec::new(),
        }
    }

    /// Opens `namespace:name`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::WriteFailed`] if a buffered opening tag could
    /// not be flushed.
    pub fn write_start_element(
        &mut self,
        namespace: XmlNamespace,
        name: &str,
    ) -> Result<(), ProtocolError> {
        self.open_element(format!("{}:{name}", namespace.prefix()))
    }

    /// Adds an attribute to the element opened last.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::WriteFailed`] when content has already been
    /// written inside the element.
    pub fn write_attribute(
        &mut self,
        name: &str,
        value: impl Display,
    ) -> Result<(), ProtocolError> {
        let start = self.pending.as_mut().ok_or_else(|| {
            ProtocolError::write_failed(format!(
                "attribute '{name}' written after element content"
            ))
        })?;
        let text = value.to_string();
        start.push_attribute((name, text.as_str()));
        if let Some(element) = self.open.last_mut() {
            if name == "xmlns" {
                element.default_namespace = Some(text);
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                element.prefixes.push((prefix.to_owned(), text));
            }
        }
        Ok(())
    }

    /// Declares `namespace` with its conventional prefix on the element opened
    /// last.
    ///
    /// # Errors
    ///
    /// See [`write_attribute`](Self::write_attribute).
    pub fn write_namespace_declaration(
        &mut self,
        namespace: XmlNamespace,
    ) -> Result<(), ProtocolError> {
        self.write_attribute(&format!("xmlns:{}", namespace.prefix()), namespace.uri())
    }

    /// Writes escaped character data inside the open element.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::WriteFailed`] if the underlying writer fails.
    pub fn write_value(&mut self, value: impl Display) -> Result<(), ProtocolError> {
        self.flush_pending()?;
        let text = value.to_string();
        self.writer
            .write_event(Event::Text(BytesText::new(&text)))
            .map_err(ProtocolError::write_failed)
    }

    /// Writes `<prefix:name>value</prefix:name>`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::WriteFailed`] if the underlying writer fails.
    pub fn write_element_value(
        &mut self,
        namespace: XmlNamespace,
        name: &str,
        value: impl Display,
    ) -> Result<(), ProtocolError> {
        self.write_start_element(namespace, name)?;
        self.write_value(value)?;
        self.write_end_element()
    }

    /// Closes the element opened last.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::WriteFailed`] when no element is open or the
    /// underlying writer fails.
    pub fn write_end_element(&mut self) -> Result<(), ProtocolError> {
        if let Some(start) = self.pending.take() {
            self.open.pop();
            return self
                .writer
                .write_event(Event::Empty(start))
                .map_err(ProtocolError::write_failed);
        }
        let element = self
            .open
            .pop()
            .ok_or_else(|| ProtocolError::write_failed("no open element to close"))?;
        self.writer
            .write_event(Event::End(BytesEnd::new(element.name)))
            .map_err(ProtocolError::write_failed)
    }

    /// Replays a token captured by a [`DocumentReader`](super::DocumentReader).
    ///
    /// Names in a known namespace are written with its conventional prefix.
    /// Any namespace a replayed element or attribute uses is declared on that
    /// element unless an enclosing element already declares it, so a replayed
    /// fragment parses on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::WriteFailed`] if the underlying writer fails
    /// or an end tag has no matching start.
    pub fn write_token(&mut self, token: &XmlToken) -> Result<(), ProtocolError> {
        match token {
            XmlToken::Start { name, attributes } => {
                self.replay_start(name)?;
                for (index, (key, value)) in attributes.iter().enumerate() {
                    let qualified = self.attribute_name(key, index)?;
                    self.write_attribute(&qualified, value)?;
                }
                Ok(())
            }
            XmlToken::End { .. } => self.write_end_element(),
            XmlToken::Text(value) => self.write_value(value),
        }
    }

    /// Replays a sequence of captured tokens.
    ///
    /// # Errors
    ///
    /// See [`write_token`](Self::write_token).
    pub fn write_tokens(&mut self, tokens: &[XmlToken]) -> Result<(), ProtocolError> {
        tokens.iter().try_for_each(|token| self.write_token(token))
    }

    /// Returns the number of elements currently open.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.open.len()
    }

    /// Finishes the document and returns its text.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::WriteFailed`] when elements remain open or the
    /// output is not valid UTF-8.
    pub fn into_document(self) -> Result<String, ProtocolError> {
        if let Some(element) = self.open.last() {
            return Err(ProtocolError::write_failed(format!(
                "element '{}' was never closed",
                element.name
            )));
        }
        String::from_utf8(self.writer.into_inner()).map_err(ProtocolError::write_failed)
    }

    fn open_element(&mut self, qualified: String) -> Result<(), ProtocolError> {
        self.flush_pending()?;
        self.open.push(OpenElement::new(qualified.clone()));
        self.pending = Some(BytesStart::new(qualified));
        Ok(())
    }

    fn replay_start(&mut self, name: &XmlName) -> Result<(), ProtocolError> {
        let local = name.local_name();
        match name.namespace() {
            Some(uri) => match XmlNamespace::from_uri(uri) {
                Some(namespace) => {
                    self.open_element(format!("{}:{local}", namespace.prefix()))?;
                    self.declare_prefix(namespace.prefix(), namespace.uri())
                }
                None => {
                    let inherited = self.default_namespace() == uri;
                    self.open_element(local.to_owned())?;
                    if inherited {
                        Ok(())
                    } else {
                        self.write_attribute("xmlns", uri)
                    }
                }
            },
            None => {
                let inherited = self.default_namespace().is_empty();
                self.open_element(local.to_owned())?;
                if inherited {
                    Ok(())
                } else {
                    self.write_attribute("xmlns", "")
                }
            }
        }
    }

    fn attribute_name(&mut self, key: &XmlName, index: usize) -> Result<String, ProtocolError> {
        let local = key.local_name();
        let Some(uri) = key.namespace() else {
            return Ok(local.to_owned());
        };
        if uri == XML_NAMESPACE {
            return Ok(format!("xml:{local}"));
        }
        let prefix = match XmlNamespace::from_uri(uri) {
            Some(namespace) => namespace.prefix().to_owned(),
            None => self
                .prefix_in_scope(uri)
                .map_or_else(|| format!("ns{index}"), str::to_owned),
        };
        self.declare_prefix(&prefix, uri)?;
        Ok(format!("{prefix}:{local}"))
    }

    fn declare_prefix(&mut self, prefix: &str, uri: &str) -> Result<(), ProtocolError> {
        if self.resolve_prefix(prefix) == Some(uri) {
            return Ok(());
        }
        self.write_attribute(&format!("xmlns:{prefix}"), uri)
    }

    fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        self.open.iter().rev().find_map(|element| {
            element
                .prefixes
                .iter()
                .rev()
                .find(|(declared, _)| declared == prefix)
                .map(|(_, uri)| uri.as_str())
        })
    }

    fn prefix_in_scope(&self, uri: &str) -> Option<&str> {
        self.open
            .iter()
            .rev()
            .flat_map(|element| element.prefixes.iter().rev())
            .map(|(prefix, _)| prefix.as_str())
            .find(|prefix| self.resolve_prefix(prefix) == Some(uri))
    }

    fn default_namespace(&self) -> &str {
        self.open
            .iter()
            .rev()
            .find_map(|element| element.default_namespace.as_deref())
            .unwrap_or_default()
    }

    fn flush_pending(&mut self) -> Result<(), ProtocolError> {
        if let Some(start) = self.pending.take() {
            self.writer
                .write_event(Event::Start(start))
                .map_err(ProtocolError::write_failed)?;
        }
        Ok(())
    }
}

impl Default for DocumentWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DocumentWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentWriter")
            .field(
                "open",
                &self.open.iter().map(|element| &element.name).collect::<Vec<_>>(),
            )
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}
