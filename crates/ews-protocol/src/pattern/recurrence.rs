use super::{
    DailyPattern, MonthlyPattern, PatternFields, PatternVariant, RecurrenceRange, WeeklyPattern,
};
use crate::codec::{DocumentReader, DocumentWriter, NodeKind, XmlNamespace};
use crate::error::ProtocolError;
use crate::legacy::{LegacyObject, TYPE_KEY};

const RECURRENCE: &str = "Recurrence";
const PATTERN_KEY: &str = "Pattern";
const RANGE_KEY: &str = "Range";

/// The known pattern variants.
///
/// This is the only place that maps element names to variants; everything
/// else goes through [`PatternVariant`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrencePattern {
    /// Every N days.
    Daily(DailyPattern),
    /// Every N weeks on a set of weekdays.
    Weekly(WeeklyPattern),
    /// Every N months on a fixed day.
    Monthly(MonthlyPattern),
}

impl RecurrencePattern {
    /// Returns an empty variant for a pattern element name.
    #[must_use]
    pub fn for_element(name: &str) -> Option<Self> {
        let pattern = match name {
            "DailyRecurrence" => Self::Daily(DailyPattern::new()),
            "WeeklyRecurrence" => Self::Weekly(WeeklyPattern::new()),
            "AbsoluteMonthlyRecurrence" => Self::Monthly(MonthlyPattern::new()),
            _ => return None,
        };
        Some(pattern)
    }

    /// Borrows the variant through the shared contract.
    #[must_use]
    pub fn as_variant(&self) -> &dyn PatternVariant {
        match self {
            Self::Daily(pattern) => pattern,
            Self::Weekly(pattern) => pattern,
            Self::Monthly(pattern) => pattern,
        }
    }

    /// Mutably borrows the variant through the shared contract.
    pub fn as_variant_mut(&mut self) -> &mut dyn PatternVariant {
        match self {
            Self::Daily(pattern) => pattern,
            Self::Weekly(pattern) => pattern,
            Self::Monthly(pattern) => pattern,
        }
    }
}

impl From<DailyPattern> for RecurrencePattern {
    fn from(pattern: DailyPattern) -> Self {
        Self::Daily(pattern)
    }
}

impl From<WeeklyPattern> for RecurrencePattern {
    fn from(pattern: WeeklyPattern) -> Self {
        Self::Weekly(pattern)
    }
}

impl From<MonthlyPattern> for RecurrencePattern {
    fn from(pattern: MonthlyPattern) -> Self {
        Self::Monthly(pattern)
    }
}

/// A pattern together with the range it applies over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    pattern: RecurrencePattern,
    range: RecurrenceRange,
}

impl Recurrence {
    /// Pairs a pattern with a range.
    #[must_use]
    pub fn new(pattern: impl Into<RecurrencePattern>, range: RecurrenceRange) -> Self {
        Self {
            pattern: pattern.into(),
            range,
        }
    }

    /// Returns the pattern.
    #[must_use]
    pub const fn pattern(&self) -> &RecurrencePattern {
        &self.pattern
    }

    /// Returns the range.
    #[must_use]
    pub const fn range(&self) -> &RecurrenceRange {
        &self.range
    }

    /// Validates the pattern, then the range.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ValidationFailure`] for the first missing
    /// field.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        self.pattern.as_variant().validate()?;
        self.range.validate()
    }

    /// Writes `<t:Recurrence>` containing the pattern and range elements.
    ///
    /// # Errors
    ///
    /// Propagates field and writer errors.
    pub fn write_to_xml(&self, writer: &mut DocumentWriter) -> Result<(), ProtocolError> {
        writer.write_start_element(XmlNamespace::Types, RECURRENCE)?;
        self.pattern.as_variant().write_to_xml(writer)?;
        self.range.write_to_xml(writer)?;
        writer.write_end_element()
    }

    /// Reads a recurrence from the `t:Recurrence` element under the cursor,
    /// leaving the cursor on its closing tag.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ValidationFailure`] when the pattern or range
    /// element is missing, [`ProtocolError::MalformedDocument`] when the
    /// element is never closed, or any field error.
    pub fn load_from_xml(reader: &mut DocumentReader) -> Result<Self, ProtocolError> {
        let mut pattern = None;
        let mut range = None;
        loop {
            match reader.advance() {
                NodeKind::StartElement if reader.is_in_namespace(XmlNamespace::Types) => {
                    let name = reader.local_name()?.to_owned();
                    if let Some(mut found) = RecurrencePattern::for_element(&name) {
                        found.as_variant_mut().load_from_xml(reader)?;
                        pattern = Some(found);
                    } else if let Some(mut found) = RecurrenceRange::for_element(&name) {
                        found.load_from_xml(reader)?;
                        range = Some(found);
                    } else {
                        reader.skip_current_element()?;
                    }
                }
                NodeKind::StartElement => reader.skip_current_element()?,
                NodeKind::EndElement if reader.is_end_element(XmlNamespace::Types, RECURRENCE) => {
                    return Self::assemble(pattern, range);
                }
                NodeKind::EndOfDocument => {
                    return Err(ProtocolError::malformed(format!(
                        "element '{RECURRENCE}' is never closed"
                    )));
                }
                NodeKind::EndElement | NodeKind::Text => {}
            }
        }
    }

    /// Encodes the recurrence as a legacy object with nested pattern and
    /// range objects.
    ///
    /// # Errors
    ///
    /// Propagates field errors.
    pub fn to_legacy_form(&self) -> Result<LegacyObject, ProtocolError> {
        let mut object = LegacyObject::with_type(RECURRENCE);
        object.add(PATTERN_KEY, self.pattern.as_variant().to_legacy_form()?);
        object.add(RANGE_KEY, self.range.to_legacy_form()?);
        Ok(object)
    }

    /// Decodes a recurrence from its legacy object.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ValidationFailure`] when the pattern or range
    /// is missing, [`ProtocolError::InvalidFieldValue`] for an unknown type
    /// discriminator, or any field error.
    pub fn from_legacy_form(object: &LegacyObject) -> Result<Self, ProtocolError> {
        let pattern = match object.object(PATTERN_KEY) {
            Some(nested) => {
                let mut pattern = RecurrencePattern::for_element(nested.type_name().unwrap_or_default())
                    .ok_or_else(|| unknown_type(&nested))?;
                pattern.as_variant_mut().load_from_legacy_form(&nested)?;
                Some(pattern)
            }
            None => None,
        };
        let range = match object.object(RANGE_KEY) {
            Some(nested) => {
                let mut range = RecurrenceRange::for_element(nested.type_name().unwrap_or_default())
                    .ok_or_else(|| unknown_type(&nested))?;
                range.load_from_legacy_form(&nested)?;
                Some(range)
            }
            None => None,
        };
        Self::assemble(pattern, range)
    }

    fn assemble(
        pattern: Option<RecurrencePattern>,
        range: Option<RecurrenceRange>,
    ) -> Result<Self, ProtocolError> {
        let pattern = pattern
            .ok_or_else(|| ProtocolError::validation("Recurrence must contain a pattern"))?;
        let range =
            range.ok_or_else(|| ProtocolError::validation("Recurrence must contain a range"))?;
        Ok(Self { pattern, range })
    }
}

fn unknown_type(object: &LegacyObject) -> ProtocolError {
    ProtocolError::invalid_value(TYPE_KEY, object.type_name().unwrap_or_default())
}
