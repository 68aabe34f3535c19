//! Recurrence pattern model.
//!
//! Patterns form an open family: every variant layers its own required
//! scalar fields over [`IntervalPattern`] and describes them exactly once, in
//! [`PatternFields::read_field`] and [`PatternFields::write_fields`]. The XML
//! and legacy encodings, completeness checks, and parse loops are provided
//! methods built on that single field list, so they never inspect which
//! variant they are driving and cannot drift apart.
//!
//! A variant's methods call its base first: base fields are read, written,
//! and validated before the variant's own fields.

mod daily;
mod monthly;
mod range;
mod recurrence;
mod weekly;


use std::str::FromStr;

use serde_json::Value;
use time::Date;
use time::macros::format_description;

use crate::codec::{DocumentReader, DocumentWriter, NodeKind, XmlNamespace};
use crate::error::ProtocolError;
use crate::legacy::LegacyObject;
use crate::property::RequiredValue;

pub use self::daily::DailyPattern;
pub use self::monthly::MonthlyPattern;
pub use self::range::{RecurrenceEnd, RecurrenceRange};
pub use self::recurrence::{Recurrence, RecurrencePattern};
pub use self::weekly::{DayOfWeek, DaysOfWeek, WeeklyPattern};

/// Scalar value of a pattern field, before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Whole number, encoded as a JSON number in the legacy form.
    Integer(i64),
    /// Free text, encoded as a JSON string.
    Text(String),
    /// Calendar date, encoded as `YYYY-MM-DD` text in both forms.
    Date(Date),
}

impl FieldValue {
    /// Renders the value as element text.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::WriteFailed`] if a date cannot be formatted.
    pub fn to_text(&self) -> Result<String, ProtocolError> {
        match self {
            Self::Integer(value) => Ok(value.to_string()),
            Self::Text(value) => Ok(value.clone()),
            Self::Date(value) => format_date(*value),
        }
    }

    /// Renders the value for the legacy encoding.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::WriteFailed`] if a date cannot be formatted.
    pub fn to_legacy(&self) -> Result<Value, ProtocolError> {
        match self {
            Self::Integer(value) => Ok(Value::from(*value)),
            Self::Text(value) => Ok(Value::from(value.as_str())),
            Self::Date(value) => format_date(*value).map(Value::from),
        }
    }
}

/// A named field emitted by [`PatternFields::write_fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternField {
    name: &'static str,
    value: FieldValue,
}

impl PatternField {
    /// Creates a field entry.
    #[must_use]
    pub const fn new(name: &'static str, value: FieldValue) -> Self {
        Self { name, value }
    }

    /// Returns the wire name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the value.
    #[must_use]
    pub const fn value(&self) -> &FieldValue {
        &self.value
    }
}

/// Field list shared by a pattern and all of its ancestors.
///
/// Implementors describe their fields once; every encoding is derived from
/// these three methods.
pub trait PatternFields {
    /// Offers one scalar field by wire name. Implementations try their base
    /// first and return `false` for names neither recognises.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidFieldValue`] when the text does not
    /// parse, or [`ProtocolError::RangeViolation`] when the setter rejects it.
    fn read_field(&mut self, name: &str, text: &str) -> Result<bool, ProtocolError>;

    /// Appends base fields, then own fields, in wire order.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UninitializedField`] when a required field has
    /// not been set.
    fn write_fields(&self, fields: &mut Vec<PatternField>) -> Result<(), ProtocolError>;

    /// Checks base completeness, then that every own required field is set.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ValidationFailure`] naming the first missing
    /// field.
    fn validate(&self) -> Result<(), ProtocolError>;

    /// Consumes the element under the cursor if it is a field this pattern
    /// recognises.
    ///
    /// Returns `false` for unrecognised elements; the caller then skips the
    /// subtree, which is a no-op for scalars the method already consumed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`read_field`](Self::read_field) and the reader.
    fn read_field_from_xml(&mut self, reader: &mut DocumentReader) -> Result<bool, ProtocolError> {
        if !reader.is_in_namespace(XmlNamespace::Types) || !reader.is_scalar_element() {
            return Ok(false);
        }
        let name = reader.local_name()?.to_owned();
        let text = reader.read_element_text()?;
        self.read_field(&name, text.trim())
    }

    /// Writes every field as a `t:` scalar element.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`write_fields`](Self::write_fields) and the
    /// writer.
    fn write_fields_to_xml(&self, writer: &mut DocumentWriter) -> Result<(), ProtocolError> {
        let mut fields = Vec::new();
        self.write_fields(&mut fields)?;
        for field in &fields {
            writer.write_element_value(XmlNamespace::Types, field.name(), field.value().to_text()?)?;
        }
        Ok(())
    }

    /// Adds every field to a legacy object.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`write_fields`](Self::write_fields).
    fn write_fields_to_legacy(&self, object: &mut LegacyObject) -> Result<(), ProtocolError> {
        let mut fields = Vec::new();
        self.write_fields(&mut fields)?;
        for field in &fields {
            object.add(field.name(), field.value().to_legacy()?);
        }
        Ok(())
    }

    /// Offers every primitive entry of a legacy object as a field. Unknown
    /// keys, including the type discriminator, are ignored.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`read_field`](Self::read_field).
    fn load_fields_from_legacy(&mut self, object: &LegacyObject) -> Result<(), ProtocolError> {
        for key in object.keys() {
            if let Some(text) = object.text(key) {
                self.read_field(key, &text)?;
            }
        }
        Ok(())
    }
}

/// A pattern that is encoded as its own element.
pub trait PatternVariant: PatternFields {
    /// Element name in the XML encoding and type discriminator in the legacy
    /// encoding.
    fn xml_element_name(&self) -> &'static str;

    /// Writes `<t:Name>fields…</t:Name>`.
    ///
    /// # Errors
    ///
    /// Propagates field and writer errors.
    fn write_to_xml(&self, writer: &mut DocumentWriter) -> Result<(), ProtocolError> {
        writer.write_start_element(XmlNamespace::Types, self.xml_element_name())?;
        self.write_fields_to_xml(writer)?;
        writer.write_end_element()
    }

    /// Populates the pattern from the element under the cursor, skipping
    /// unrecognised children, and leaves the cursor on its closing tag.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedDocument`] if the element is never
    /// closed, or any field error.
    fn load_from_xml(&mut self, reader: &mut DocumentReader) -> Result<(), ProtocolError> {
        let element = self.xml_element_name();
        loop {
            match reader.advance() {
                NodeKind::StartElement => {
                    if !self.read_field_from_xml(reader)? {
                        reader.skip_current_element()?;
                    }
                }
                NodeKind::EndElement if reader.is_end_element(XmlNamespace::Types, element) => {
                    return Ok(());
                }
                NodeKind::EndOfDocument => {
                    return Err(ProtocolError::malformed(format!(
                        "element '{element}' is never closed"
                    )));
                }
                NodeKind::EndElement | NodeKind::Text => {}
            }
        }
    }

    /// Encodes the pattern as a legacy object tagged with its element name.
    ///
    /// # Errors
    ///
    /// Propagates field errors.
    fn to_legacy_form(&self) -> Result<LegacyObject, ProtocolError> {
        let mut object = LegacyObject::with_type(self.xml_element_name());
        self.write_fields_to_legacy(&mut object)?;
        Ok(object)
    }

    /// Populates the pattern from a legacy object.
    ///
    /// # Errors
    ///
    /// Propagates field errors.
    fn load_from_legacy_form(&mut self, object: &LegacyObject) -> Result<(), ProtocolError> {
        self.load_fields_from_legacy(object)
    }
}

/// Base of every recurrence pattern: the number of period units between
/// occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalPattern {
    interval: RequiredValue<u32>,
}

const INTERVAL: &str = "Interval";

impl IntervalPattern {
    /// Creates a pattern whose interval is not yet set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interval: RequiredValue::unset(INTERVAL),
        }
    }

    /// Returns the interval.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UninitializedField`] if it was never set.
    pub fn interval(&self) -> Result<u32, ProtocolError> {
        self.interval.get().copied()
    }

    /// Sets the interval, which must be at least 1.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::RangeViolation`] for 0.
    pub fn set_interval(&mut self, interval: u32) -> Result<(), ProtocolError> {
        self.interval.set_in_range(interval, 1..=u32::MAX)
    }
}

impl Default for IntervalPattern {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternFields for IntervalPattern {
    fn read_field(&mut self, name: &str, text: &str) -> Result<bool, ProtocolError> {
        match name {
            INTERVAL => {
                self.set_interval(parse_scalar(name, text)?)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn write_fields(&self, fields: &mut Vec<PatternField>) -> Result<(), ProtocolError> {
        fields.push(PatternField::new(
            INTERVAL,
            FieldValue::Integer(i64::from(self.interval()?)),
        ));
        Ok(())
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        self.interval.require()
    }
}

/// Parses trimmed scalar text as `T`, reporting the field on failure.
pub(crate) fn parse_scalar<T: FromStr>(field: &str, text: &str) -> Result<T, ProtocolError> {
    text.trim()
        .parse()
        .map_err(|_| ProtocolError::invalid_value(field, text))
}

/// Parses `YYYY-MM-DD`, ignoring any trailing zone designator.
pub(crate) fn parse_date(field: &str, text: &str) -> Result<Date, ProtocolError> {
    let trimmed = text.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse(date_part, format_description!("[year]-[month]-[day]"))
        .map_err(|_| ProtocolError::invalid_value(field, text))
}

/// Formats a date as `YYYY-MM-DD`.
pub(crate) fn format_date(date: Date) -> Result<String, ProtocolError> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(ProtocolError::write_failed)
}
