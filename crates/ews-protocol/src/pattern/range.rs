use time::Date;

use super::{FieldValue, PatternField, PatternFields, PatternVariant, parse_date, parse_scalar};
use crate::error::ProtocolError;
use crate::property::RequiredValue;

const START_DATE: &str = "StartDate";
const END_DATE: &str = "EndDate";
const NUMBER_OF_OCCURRENCES: &str = "NumberOfOccurrences";

const NO_END: &str = "NoEndRecurrence";
const END_DATE_RANGE: &str = "EndDateRecurrence";
const NUMBERED: &str = "NumberedRecurrence";

/// How a recurrence terminates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceEnd {
    /// Never ends.
    NoEnd,
    /// Ends on a date.
    EndDate(RequiredValue<Date>),
    /// Ends after a number of occurrences.
    Occurrences(RequiredValue<u32>),
}

/// Start date and termination of a recurrence.
///
/// Each termination kind is its own element, so the range plugs into the
/// same field machinery as the patterns it accompanies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRange {
    start_date: RequiredValue<Date>,
    end: RecurrenceEnd,
}

impl RecurrenceRange {
    /// Creates an open-ended range with no start date yet.
    #[must_use]
    pub const fn no_end() -> Self {
        Self::with_end(RecurrenceEnd::NoEnd)
    }

    /// Creates a range ending on a date, with neither date set yet.
    #[must_use]
    pub const fn end_date() -> Self {
        Self::with_end(RecurrenceEnd::EndDate(RequiredValue::unset(END_DATE)))
    }

    /// Creates a range ending after a count, with no values set yet.
    #[must_use]
    pub const fn numbered() -> Self {
        Self::with_end(RecurrenceEnd::Occurrences(RequiredValue::unset(
            NUMBER_OF_OCCURRENCES,
        )))
    }

    const fn with_end(end: RecurrenceEnd) -> Self {
        Self {
            start_date: RequiredValue::unset(START_DATE),
            end,
        }
    }

    /// Returns an empty range for one of the three range element names.
    #[must_use]
    pub fn for_element(name: &str) -> Option<Self> {
        match name {
            NO_END => Some(Self::no_end()),
            END_DATE_RANGE => Some(Self::end_date()),
            NUMBERED => Some(Self::numbered()),
            _ => None,
        }
    }

    /// Returns the first date of the recurrence.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UninitializedField`] if it was never set.
    pub fn start_date(&self) -> Result<Date, ProtocolError> {
        self.start_date.get().copied()
    }

    /// Sets the first date of the recurrence.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::RangeViolation`] when an end date already set
    /// precedes `date`. The stored start date is left unchanged.
    pub fn set_start_date(&mut self, date: Date) -> Result<(), ProtocolError> {
        match self.end_date_value() {
            Some(end) => self.start_date.set_in_range(date, Date::MIN..=end),
            None => {
                self.start_date.set(date);
                Ok(())
            }
        }
    }

    fn end_date_value(&self) -> Option<Date> {
        match &self.end {
            RecurrenceEnd::EndDate(end) => end.get().ok().copied(),
            RecurrenceEnd::NoEnd | RecurrenceEnd::Occurrences(_) => None,
        }
    }

    /// Returns the termination.
    #[must_use]
    pub const fn end(&self) -> &RecurrenceEnd {
        &self.end
    }

    /// Sets the end date of an end-date range.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ValidationFailure`] when the range is of a
    /// different kind, or [`ProtocolError::RangeViolation`] when the end
    /// precedes a start date already set.
    pub fn set_end_date(&mut self, date: Date) -> Result<(), ProtocolError> {
        let RecurrenceEnd::EndDate(end) = &mut self.end else {
            return Err(ProtocolError::validation(format!(
                "{END_DATE} applies only to {END_DATE_RANGE}"
            )));
        };
        match self.start_date.get() {
            Ok(start) => end.set_in_range(date, *start..=Date::MAX),
            Err(_) => {
                end.set(date);
                Ok(())
            }
        }
    }

    /// Sets the occurrence count of a numbered range, which must be at
    /// least 1.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ValidationFailure`] when the range is of a
    /// different kind, or [`ProtocolError::RangeViolation`] for 0.
    pub fn set_number_of_occurrences(&mut self, count: u32) -> Result<(), ProtocolError> {
        let RecurrenceEnd::Occurrences(occurrences) = &mut self.end else {
            return Err(ProtocolError::validation(format!(
                "{NUMBER_OF_OCCURRENCES} applies only to {NUMBERED}"
            )));
        };
        occurrences.set_in_range(count, 1..=u32::MAX)
    }
}

impl PatternFields for RecurrenceRange {
    fn read_field(&mut self, name: &str, text: &str) -> Result<bool, ProtocolError> {
        let element = self.xml_element_name();
        match (name, element) {
            (START_DATE, _) => {
                self.set_start_date(parse_date(name, text)?)?;
                Ok(true)
            }
            (END_DATE, END_DATE_RANGE) => {
                self.set_end_date(parse_date(name, text)?)?;
                Ok(true)
            }
            (NUMBER_OF_OCCURRENCES, NUMBERED) => {
                self.set_number_of_occurrences(parse_scalar(name, text)?)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn write_fields(&self, fields: &mut Vec<PatternField>) -> Result<(), ProtocolError> {
        fields.push(PatternField::new(
            START_DATE,
            FieldValue::Date(self.start_date()?),
        ));
        match &self.end {
            RecurrenceEnd::NoEnd => {}
            RecurrenceEnd::EndDate(end) => {
                fields.push(PatternField::new(END_DATE, FieldValue::Date(*end.get()?)));
            }
            RecurrenceEnd::Occurrences(count) => fields.push(PatternField::new(
                NUMBER_OF_OCCURRENCES,
                FieldValue::Integer(i64::from(*count.get()?)),
            )),
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        self.start_date.require()?;
        match &self.end {
            RecurrenceEnd::NoEnd => Ok(()),
            RecurrenceEnd::EndDate(end) => {
                end.require()?;
                if end.get()? < self.start_date.get()? {
                    return Err(ProtocolError::validation(format!(
                        "{END_DATE} must not precede {START_DATE}"
                    )));
                }
                Ok(())
            }
            RecurrenceEnd::Occurrences(count) => count.require(),
        }
    }
}

impl PatternVariant for RecurrenceRange {
    fn xml_element_name(&self) -> &'static str {
        match self.end {
            RecurrenceEnd::NoEnd => NO_END,
            RecurrenceEnd::EndDate(_) => END_DATE_RANGE,
            RecurrenceEnd::Occurrences(_) => NUMBERED,
        }
    }
}
