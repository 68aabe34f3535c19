use super::{FieldValue, IntervalPattern, PatternField, PatternFields, PatternVariant, parse_scalar};
use crate::error::ProtocolError;
use crate::property::RequiredValue;

const DAY_OF_MONTH: &str = "DayOfMonth";

/// Recurs every `interval` months on a fixed day of the month.
///
/// # Example
///
/// ```
/// use ews_protocol::pattern::{MonthlyPattern, PatternFields};
///
/// let mut pattern = MonthlyPattern::new();
/// assert!(pattern.validate().is_err());
/// pattern.set_interval(2)?;
/// pattern.set_day_of_month(15)?;
/// pattern.validate()?;
/// assert!(pattern.set_day_of_month(32).is_err());
/// assert_eq!(pattern.day_of_month()?, 15);
/// # Ok::<(), ews_protocol::ProtocolError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyPattern {
    base: IntervalPattern,
    day_of_month: RequiredValue<u32>,
}

impl MonthlyPattern {
    /// Creates an empty pattern, ready to be populated by parsing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base: IntervalPattern::new(),
            day_of_month: RequiredValue::unset(DAY_OF_MONTH),
        }
    }

    /// Creates a fully parameterised pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::RangeViolation`] if either value is outside
    /// its domain.
    pub fn with_values(interval: u32, day_of_month: u32) -> Result<Self, ProtocolError> {
        let mut pattern = Self::new();
        pattern.set_interval(interval)?;
        pattern.set_day_of_month(day_of_month)?;
        Ok(pattern)
    }

    /// Returns the interval in months.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UninitializedField`] if it was never set.
    pub fn interval(&self) -> Result<u32, ProtocolError> {
        self.base.interval()
    }

    /// Sets the interval in months.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::RangeViolation`] for 0.
    pub fn set_interval(&mut self, interval: u32) -> Result<(), ProtocolError> {
        self.base.set_interval(interval)
    }

    /// Returns the day of the month.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UninitializedField`] if it was never set.
    pub fn day_of_month(&self) -> Result<u32, ProtocolError> {
        self.day_of_month.get().copied()
    }

    /// Sets the day of the month, which must lie in `1..=31`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::RangeViolation`] otherwise; the stored value
    /// is left unchanged.
    pub fn set_day_of_month(&mut self, day: u32) -> Result<(), ProtocolError> {
        self.day_of_month.set_in_range(day, 1..=31)
    }
}

impl Default for MonthlyPattern {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternFields for MonthlyPattern {
    fn read_field(&mut self, name: &str, text: &str) -> Result<bool, ProtocolError> {
        if self.base.read_field(name, text)? {
            return Ok(true);
        }
        match name {
            DAY_OF_MONTH => {
                self.set_day_of_month(parse_scalar(name, text)?)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn write_fields(&self, fields: &mut Vec<PatternField>) -> Result<(), ProtocolError> {
        self.base.write_fields(fields)?;
        fields.push(PatternField::new(
            DAY_OF_MONTH,
            FieldValue::Integer(i64::from(self.day_of_month()?)),
        ));
        Ok(())
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        self.base.validate()?;
        self.day_of_month.require()
    }
}

impl PatternVariant for MonthlyPattern {
    fn xml_element_name(&self) -> &'static str {
        "AbsoluteMonthlyRecurrence"
    }
}
