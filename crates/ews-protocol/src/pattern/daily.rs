use super::{IntervalPattern, PatternField, PatternFields, PatternVariant};
use crate::error::ProtocolError;

/// Recurs every `interval` days. Adds no fields of its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DailyPattern {
    base: IntervalPattern,
}

impl DailyPattern {
    /// Creates an empty pattern.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base: IntervalPattern::new(),
        }
    }

    /// Creates a pattern recurring every `interval` days.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::RangeViolation`] for an interval of 0.
    pub fn with_interval(interval: u32) -> Result<Self, ProtocolError> {
        let mut pattern = Self::new();
        pattern.set_interval(interval)?;
        Ok(pattern)
    }

    /// Returns the interval in days.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UninitializedField`] if it was never set.
    pub fn interval(&self) -> Result<u32, ProtocolError> {
        self.base.interval()
    }

    /// Sets the interval in days.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::RangeViolation`] for 0.
    pub fn set_interval(&mut self, interval: u32) -> Result<(), ProtocolError> {
        self.base.set_interval(interval)
    }
}

impl PatternFields for DailyPattern {
    fn read_field(&mut self, name: &str, text: &str) -> Result<bool, ProtocolError> {
        self.base.read_field(name, text)
    }

    fn write_fields(&self, fields: &mut Vec<PatternField>) -> Result<(), ProtocolError> {
        self.base.write_fields(fields)
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        self.base.validate()
    }
}

impl PatternVariant for DailyPattern {
    fn xml_element_name(&self) -> &'static str {
        "DailyRecurrence"
    }
}
