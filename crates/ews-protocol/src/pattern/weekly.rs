use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumString};

use super::{FieldValue, IntervalPattern, PatternField, PatternFields, PatternVariant, parse_scalar};
use crate::error::ProtocolError;
use crate::property::RequiredValue;

const DAYS_OF_WEEK: &str = "DaysOfWeek";
const FIRST_DAY_OF_WEEK: &str = "FirstDayOfWeek";

/// A day of the week as spelled on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString)]
pub enum DayOfWeek {
    /// Sunday.
    Sunday,
    /// Monday.
    Monday,
    /// Tuesday.
    Tuesday,
    /// Wednesday.
    Wednesday,
    /// Thursday.
    Thursday,
    /// Friday.
    Friday,
    /// Saturday.
    Saturday,
}

/// Non-empty, duplicate-free set of days, encoded as a space-separated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaysOfWeek(Vec<DayOfWeek>);

impl DaysOfWeek {
    /// Builds the set, dropping duplicates and keeping first-seen order.
    /// Returns `None` when `days` is empty.
    #[must_use]
    pub fn new(days: impl IntoIterator<Item = DayOfWeek>) -> Option<Self> {
        let mut unique = Vec::new();
        for day in days {
            if !unique.contains(&day) {
                unique.push(day);
            }
        }
        (!unique.is_empty()).then_some(Self(unique))
    }

    /// Returns the days in order.
    #[must_use]
    pub fn days(&self) -> &[DayOfWeek] {
        &self.0
    }
}

impl fmt::Display for DaysOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";
        for day in &self.0 {
            write!(f, "{separator}{day}")?;
            separator = " ";
        }
        Ok(())
    }
}

impl FromStr for DaysOfWeek {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days = s
            .split_whitespace()
            .map(DayOfWeek::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(days).ok_or(strum::ParseError::VariantNotFound)
    }
}

/// Recurs every `interval` weeks on a set of weekdays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyPattern {
    base: IntervalPattern,
    days_of_week: RequiredValue<DaysOfWeek>,
    first_day_of_week: Option<DayOfWeek>,
}

impl WeeklyPattern {
    /// Creates an empty pattern.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base: IntervalPattern::new(),
            days_of_week: RequiredValue::unset(DAYS_OF_WEEK),
            first_day_of_week: None,
        }
    }

    /// Creates a pattern recurring every `interval` weeks on `days`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::RangeViolation`] for an interval of 0 or an
    /// empty day set.
    pub fn with_values(
        interval: u32,
        days: impl IntoIterator<Item = DayOfWeek>,
    ) -> Result<Self, ProtocolError> {
        let mut pattern = Self::new();
        pattern.set_interval(interval)?;
        pattern.set_days_of_week(days)?;
        Ok(pattern)
    }

    /// Returns the interval in weeks.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UninitializedField`] if it was never set.
    pub fn interval(&self) -> Result<u32, ProtocolError> {
        self.base.interval()
    }

    /// Sets the interval in weeks.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::RangeViolation`] for 0.
    pub fn set_interval(&mut self, interval: u32) -> Result<(), ProtocolError> {
        self.base.set_interval(interval)
    }

    /// Returns the days the pattern recurs on.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UninitializedField`] if they were never set.
    pub fn days_of_week(&self) -> Result<&DaysOfWeek, ProtocolError> {
        self.days_of_week.get()
    }

    /// Sets the days the pattern recurs on.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::RangeViolation`] when `days` is empty; the
    /// stored value is left unchanged.
    pub fn set_days_of_week(
        &mut self,
        days: impl IntoIterator<Item = DayOfWeek>,
    ) -> Result<(), ProtocolError> {
        let days = DaysOfWeek::new(days).ok_or_else(|| ProtocolError::RangeViolation {
            field: DAYS_OF_WEEK,
            value: "no days".to_owned(),
            min: "1 day".to_owned(),
            max: "7 days".to_owned(),
        })?;
        self.days_of_week.set(days);
        Ok(())
    }

    /// Returns the day a week is considered to start on, if given.
    #[must_use]
    pub const fn first_day_of_week(&self) -> Option<DayOfWeek> {
        self.first_day_of_week
    }

    /// Sets or clears the first day of the week.
    pub const fn set_first_day_of_week(&mut self, day: Option<DayOfWeek>) {
        self.first_day_of_week = day;
    }
}

impl Default for WeeklyPattern {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternFields for WeeklyPattern {
    fn read_field(&mut self, name: &str, text: &str) -> Result<bool, ProtocolError> {
        if self.base.read_field(name, text)? {
            return Ok(true);
        }
        match name {
            DAYS_OF_WEEK => {
                let days: DaysOfWeek = parse_scalar(name, text)?;
                self.days_of_week.set(days);
                Ok(true)
            }
            FIRST_DAY_OF_WEEK => {
                self.first_day_of_week = Some(parse_scalar(name, text)?);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn write_fields(&self, fields: &mut Vec<PatternField>) -> Result<(), ProtocolError> {
        self.base.write_fields(fields)?;
        fields.push(PatternField::new(
            DAYS_OF_WEEK,
            FieldValue::Text(self.days_of_week()?.to_string()),
        ));
        if let Some(day) = self.first_day_of_week {
            fields.push(PatternField::new(
                FIRST_DAY_OF_WEEK,
                FieldValue::Text(day.to_string()),
            ));
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        self.base.validate()?;
        self.days_of_week.require()
    }
}

impl PatternVariant for WeeklyPattern {
    fn xml_element_name(&self) -> &'static str {
        "WeeklyRecurrence"
    }
}
