//! Read cursor over a tokenised document.

use std::str::FromStr;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use super::{XmlName, XmlNamespace, XmlToken};
use crate::error::ProtocolError;

/// Kind of node the cursor is positioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// An opening tag.
    StartElement,
    /// A closing tag.
    EndElement,
    /// Character data.
    Text,
    /// The cursor has moved past the last token.
    EndOfDocument,
}

/// Forward-only read cursor over an inbound document.
///
/// The cursor starts before the first token. [`advance`](Self::advance) moves
/// to the next token; the element helpers consume whole elements and leave the
/// cursor on the element's closing tag so callers can keep looping with
/// `advance`.
///
/// # Example
///
/// ```
/// use ews_protocol::codec::{DocumentReader, NodeKind, XmlNamespace};
///
/// let mut reader = DocumentReader::parse(
///     r#"<t:Interval xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">2</t:Interval>"#,
/// )?;
/// assert_eq!(reader.advance(), NodeKind::StartElement);
/// assert!(reader.is_start_element(XmlNamespace::Types, "Interval"));
/// let interval: u32 = reader.read_element_value()?;
/// assert_eq!(interval, 2);
/// # Ok::<(), ews_protocol::ProtocolError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DocumentReader {
    tokens: Vec<XmlToken>,
    next: usize,
    current: Option<usize>,
}

impl DocumentReader {
    /// Tokenises a complete document or a fragment with several roots.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedDocument`] if the text is not
    /// well-formed XML or uses an undeclared namespace prefix.
    pub fn parse(document: &str) -> Result<Self, ProtocolError> {
        tokenise(document).map(Self::from_tokens)
    }

    /// Creates a cursor over tokens captured from another document.
    #[must_use]
    pub const fn from_tokens(tokens: Vec<XmlToken>) -> Self {
        Self {
            tokens,
            next: 0,
            current: None,
        }
    }

    /// Moves to the next token and reports its kind.
    pub fn advance(&mut self) -> NodeKind {
        if self.tokens.get(self.next).is_none() {
            self.current = None;
            self.next = self.tokens.len().saturating_add(1);
            return NodeKind::EndOfDocument;
        }
        self.current = Some(self.next);
        self.next = self.next.saturating_add(1);
        self.node_kind()
    }

    /// Reports the kind of the token under the cursor.
    #[must_use]
    pub fn node_kind(&self) -> NodeKind {
        match self.current_token() {
            Some(XmlToken::Start { .. }) => NodeKind::StartElement,
            Some(XmlToken::End { .. }) => NodeKind::EndElement,
            Some(XmlToken::Text(_)) => NodeKind::Text,
            None => NodeKind::EndOfDocument,
        }
    }

    /// Returns the name of the element under the cursor.
    #[must_use]
    pub fn current_name(&self) -> Option<&XmlName> {
        self.current_token().and_then(XmlToken::name)
    }

    /// Returns the local name of the element under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedDocument`] when the cursor is not on
    /// an element.
    pub fn local_name(&self) -> Result<&str, ProtocolError> {
        self.current_name()
            .map(XmlName::local_name)
            .ok_or_else(|| ProtocolError::malformed("cursor is not positioned on an element"))
    }

    /// Returns the namespace URI of the element under the cursor.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.current_name().and_then(XmlName::namespace)
    }

    /// Returns `true` when the element under the cursor is in `namespace`.
    #[must_use]
    pub fn is_in_namespace(&self, namespace: XmlNamespace) -> bool {
        self.namespace() == Some(namespace.uri())
    }

    /// Looks up an attribute on the opening tag under the cursor.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self.current_token() {
            Some(XmlToken::Start { attributes, .. }) => attributes
                .iter()
                .find(|(key, _)| key.namespace().is_none() && key.local_name() == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// Returns `true` when the cursor is on the opening tag `namespace:name`.
    #[must_use]
    pub fn is_start_element(&self, namespace: XmlNamespace, name: &str) -> bool {
        matches!(
            self.current_token(),
            Some(XmlToken::Start { name: element, .. }) if element.is(namespace, name)
        )
    }

    /// Returns `true` when the cursor is on the closing tag `namespace:name`.
    #[must_use]
    pub fn is_end_element(&self, namespace: XmlNamespace, name: &str) -> bool {
        matches!(
            self.current_token(),
            Some(XmlToken::End { name: element }) if element.is(namespace, name)
        )
    }

    /// Returns `true` when the element under the cursor contains no child
    /// elements, so it can be read as a scalar.
    #[must_use]
    pub fn is_scalar_element(&self) -> bool {
        let Some(start) = self.start_index() else {
            return false;
        };
        let Ok(end) = self.matching_end(start) else {
            return false;
        };
        self.tokens
            .get(start.saturating_add(1)..end)
            .is_some_and(|inner| inner.iter().all(|token| matches!(token, XmlToken::Text(_))))
    }

    /// Searches the subtree of the current element (or the whole document
    /// when nothing has been read yet) for the first opening tag
    /// `namespace:name`.
    ///
    /// On success the cursor rests on the descendant. Otherwise it rests on
    /// the closing tag of the element searched, or at end of document.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedDocument`] when the current element
    /// is never closed.
    pub fn read_to_descendant(
        &mut self,
        namespace: XmlNamespace,
        name: &str,
    ) -> Result<bool, ProtocolError> {
        let (from, to) = match self.current {
            None => (0, self.tokens.len()),
            Some(_) => {
                let start = self.require_start()?;
                (start.saturating_add(1), self.matching_end(start)?)
            }
        };
        let found = self.tokens.get(from..to).and_then(|range| {
            range.iter().position(|token| {
                matches!(token, XmlToken::Start { name: element, .. } if element.is(namespace, name))
            })
        });
        if let Some(offset) = found {
            self.seek(from.saturating_add(offset));
            return Ok(true);
        }
        if to < self.tokens.len() {
            self.seek(to);
        } else {
            self.current = None;
            self.next = self.tokens.len().saturating_add(1);
        }
        Ok(false)
    }

    /// Reads the text content of the current element and leaves the cursor on
    /// its closing tag. An empty element yields an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedDocument`] when the cursor is not on
    /// an opening tag or the element has child elements.
    pub fn read_element_text(&mut self) -> Result<String, ProtocolError> {
        let start = self.require_start()?;
        let end = self.matching_end(start)?;
        let mut text = String::new();
        for token in self.tokens.get(start.saturating_add(1)..end).unwrap_or_default() {
            match token {
                XmlToken::Text(value) => text.push_str(value),
                XmlToken::Start { name, .. } | XmlToken::End { name } => {
                    return Err(ProtocolError::malformed(format!(
                        "element '{}' contains child element '{}' where a value was expected",
                        self.local_name()?,
                        name.local_name(),
                    )));
                }
            }
        }
        self.seek(end);
        Ok(text)
    }

    /// Reads the current element's text and parses it as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidFieldValue`] when the text does not
    /// parse, or any error from [`read_element_text`](Self::read_element_text).
    pub fn read_element_value<T: FromStr>(&mut self) -> Result<T, ProtocolError> {
        let field = self.local_name()?.to_owned();
        let text = self.read_element_text()?;
        text.trim()
            .parse()
            .map_err(|_| ProtocolError::invalid_value(field, text))
    }

    /// Captures every token strictly inside the current element and leaves the
    /// cursor on its closing tag.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedDocument`] when the cursor is not on
    /// an opening tag.
    pub fn read_inner_tokens(&mut self) -> Result<Vec<XmlToken>, ProtocolError> {
        let start = self.require_start()?;
        let end = self.matching_end(start)?;
        let inner = self
            .tokens
            .get(start.saturating_add(1)..end)
            .map(<[XmlToken]>::to_vec)
            .unwrap_or_default();
        self.seek(end);
        Ok(inner)
    }

    /// Captures the current element including its own tags and leaves the
    /// cursor on its closing tag.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedDocument`] when the cursor is not on
    /// an opening tag.
    pub fn read_outer_tokens(&mut self) -> Result<Vec<XmlToken>, ProtocolError> {
        let start = self.require_start()?;
        let end = self.matching_end(start)?;
        let outer = self
            .tokens
            .get(start..=end)
            .map(<[XmlToken]>::to_vec)
            .unwrap_or_default();
        self.seek(end);
        Ok(outer)
    }

    /// Skips the subtree of the element under the cursor, leaving the cursor
    /// on its closing tag. Does nothing when the cursor is not on an opening
    /// tag.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedDocument`] when the element is never
    /// closed.
    pub fn skip_current_element(&mut self) -> Result<(), ProtocolError> {
        if let Some(start) = self.start_index() {
            let end = self.matching_end(start)?;
            self.seek(end);
        }
        Ok(())
    }

    fn current_token(&self) -> Option<&XmlToken> {
        self.current.and_then(|index| self.tokens.get(index))
    }

    fn start_index(&self) -> Option<usize> {
        match self.current_token() {
            Some(XmlToken::Start { .. }) => self.current,
            _ => None,
        }
    }

    fn require_start(&self) -> Result<usize, ProtocolError> {
        self.start_index()
            .ok_or_else(|| ProtocolError::malformed("cursor is not positioned on an opening tag"))
    }

    fn matching_end(&self, start: usize) -> Result<usize, ProtocolError> {
        let mut depth = 0_usize;
        let following = self.tokens.iter().enumerate().skip(start.saturating_add(1));
        for (index, token) in following {
            match token {
                XmlToken::Start { .. } => depth = depth.saturating_add(1),
                XmlToken::End { .. } if depth == 0 => return Ok(index),
                XmlToken::End { .. } => depth = depth.saturating_sub(1),
                XmlToken::Text(_) => {}
            }
        }
        Err(ProtocolError::malformed("element is never closed"))
    }

    fn seek(&mut self, index: usize) {
        self.current = Some(index);
        self.next = index.saturating_add(1);
    }
}

fn tokenise(document: &str) -> Result<Vec<XmlToken>, ProtocolError> {
    let mut reader = NsReader::from_str(document);
    reader.config_mut().expand_empty_elements = true;

    let mut tokens = Vec::new();
    loop {
        let (resolution, event) = reader
            .read_resolved_event()
            .map_err(ProtocolError::parse_failed)?;
        match event {
            Event::Start(start) => {
                let name = resolve_name(&resolution, start.local_name().as_ref())?;
                let attributes = read_attributes(&reader, &start)?;
                tokens.push(XmlToken::Start { name, attributes });
            }
            Event::End(end) => {
                let name = resolve_name(&resolution, end.local_name().as_ref())?;
                tokens.push(XmlToken::End { name });
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(ProtocolError::parse_failed)?;
                // Indentation between elements is dropped; text inside a
                // value keeps its surrounding spaces.
                if !value.trim().is_empty() {
                    tokens.push(XmlToken::Text(value.into_owned()));
                }
            }
            Event::CData(data) => {
                let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                tokens.push(XmlToken::Text(value));
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(tokens)
}

fn resolve_name(resolution: &ResolveResult<'_>, local_name: &[u8]) -> Result<XmlName, ProtocolError> {
    let local = decode_utf8(local_name)?;
    let namespace = bound_namespace(resolution, &local)?;
    Ok(XmlName::new(namespace, local))
}

fn bound_namespace(
    resolution: &ResolveResult<'_>,
    local: &str,
) -> Result<Option<String>, ProtocolError> {
    match resolution {
        ResolveResult::Bound(namespace) => Ok(Some(decode_utf8(namespace.as_ref())?)),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(ProtocolError::malformed(format!(
            "'{local}' uses undeclared prefix '{}'",
            String::from_utf8_lossy(prefix),
        ))),
    }
}

fn read_attributes(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
) -> Result<Vec<(XmlName, String)>, ProtocolError> {
    let mut attributes = Vec::new();
    for entry in start.attributes() {
        let attribute = entry.map_err(ProtocolError::parse_failed)?;
        if attribute.key.as_namespace_binding().is_some() {
            continue;
        }
        let (resolution, local_name) = reader.resolve_attribute(attribute.key);
        let local = decode_utf8(local_name.as_ref())?;
        let namespace = bound_namespace(&resolution, &local)?;
        let value = attribute
            .unescape_value()
            .map_err(ProtocolError::parse_failed)?
            .into_owned();
        attributes.push((XmlName::new(namespace, local), value));
    }
    Ok(attributes)
}

fn decode_utf8(bytes: &[u8]) -> Result<String, ProtocolError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(ProtocolError::parse_failed)
}
