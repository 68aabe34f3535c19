//! Required-field storage shared by the pattern model and requests.
//!
//! A [`RequiredValue`] may legitimately be empty while an object is being
//! built or parsed, but reading it before it was set is a programming error.
//! Three distinct failures hang off it: reading an unset value
//! ([`ProtocolError::UninitializedField`]), assigning outside the declared
//! domain ([`ProtocolError::RangeViolation`]), and finding it unset at a
//! commit point ([`ProtocolError::ValidationFailure`]).

use std::fmt::Display;
use std::ops::RangeInclusive;

use crate::error::ProtocolError;

/// A field that must be assigned before it is read.
///
/// # Example
///
/// ```
/// use ews_protocol::property::RequiredValue;
///
/// let mut day = RequiredValue::<u32>::unset("DayOfMonth");
/// assert!(day.get().is_err());
/// day.set_in_range(15, 1..=31)?;
/// assert_eq!(day.get()?, &15);
/// assert!(day.set_in_range(32, 1..=31).is_err());
/// assert_eq!(day.get()?, &15);
/// # Ok::<(), ews_protocol::ProtocolError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredValue<T> {
    name: &'static str,
    value: Option<T>,
}

impl<T> RequiredValue<T> {
    /// Creates an unset field with the given wire name.
    #[must_use]
    pub const fn unset(name: &'static str) -> Self {
        Self { name, value: None }
    }

    /// Returns the wire name of the field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` once a value has been assigned.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Reads the value.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UninitializedField`] if the field was never
    /// set.
    pub fn get(&self) -> Result<&T, ProtocolError> {
        self.value
            .as_ref()
            .ok_or(ProtocolError::UninitializedField { field: self.name })
    }

    /// Assigns the value without a domain check.
    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    /// Checks that the field has been assigned.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ValidationFailure`] naming the field if it is
    /// unset.
    pub fn require(&self) -> Result<(), ProtocolError> {
        if self.is_set() {
            Ok(())
        } else {
            Err(ProtocolError::validation(format!(
                "{} must be set",
                self.name
            )))
        }
    }
}

impl<T: PartialOrd + Display> RequiredValue<T> {
    /// Assigns the value after checking it lies in `domain`. A rejected value
    /// leaves the stored value untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::RangeViolation`] when `value` is outside
    /// `domain`.
    pub fn set_in_range(&mut self, value: T, domain: RangeInclusive<T>) -> Result<(), ProtocolError> {
        if !domain.contains(&value) {
            return Err(ProtocolError::RangeViolation {
                field: self.name,
                value: value.to_string(),
                min: domain.start().to_string(),
                max: domain.end().to_string(),
            });
        }
        self.value = Some(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::error::ProtocolErrorKind;

    #[test]
    fn unset_value_fails_on_read() {
        let field = RequiredValue::<u32>::unset("Interval");
        let error = field.get().expect_err("unset");
        assert!(matches!(
            error,
            ProtocolError::UninitializedField { field: "Interval" }
        ));
    }

    #[test]
    fn require_reports_validation_failure() {
        let field = RequiredValue::<u32>::unset("Interval");
        let error = field.require().expect_err("unset");
        assert_eq!(error.kind(), ProtocolErrorKind::ValidationFailure);
        assert!(error.to_string().contains("Interval must be set"));
    }

    #[rstest]
    #[case::lower_bound(1)]
    #[case::upper_bound(31)]
    fn set_in_range_accepts_bounds(#[case] value: u32) {
        let mut field = RequiredValue::unset("DayOfMonth");
        field.set_in_range(value, 1..=31).expect("in range");
        assert_eq!(field.get().expect("set"), &value);
        field.require().expect("complete");
    }

    #[rstest]
    #[case::below(0)]
    #[case::above(32)]
    fn set_in_range_rejects_without_mutating(#[case] value: u32) {
        let mut field = RequiredValue::unset("DayOfMonth");
        field.set(7);
        let error = field.set_in_range(value, 1..=31).expect_err("out of range");
        assert_eq!(error.kind(), ProtocolErrorKind::RangeViolation);
        assert_eq!(field.get().expect("unchanged"), &7);
    }
}
