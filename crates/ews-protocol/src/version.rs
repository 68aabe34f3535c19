//! Protocol versions understood by the marshalling core.
//!
//! Versions are totally ordered from oldest to newest so the dispatcher can
//! compare a request's minimum version against the negotiated live version.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Server protocol revision.
///
/// # Example
///
/// ```
/// use ews_protocol::ExchangeVersion;
///
/// let live: ExchangeVersion = "Exchange2010_SP1".parse().expect("known version");
/// assert!(live < ExchangeVersion::Exchange2010Sp2);
/// assert_eq!(live.to_string(), "Exchange2010_SP1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExchangeVersion {
    /// Exchange 2007 Service Pack 1.
    Exchange2007Sp1,
    /// Exchange 2010.
    Exchange2010,
    /// Exchange 2010 Service Pack 1.
    Exchange2010Sp1,
    /// Exchange 2010 Service Pack 2.
    Exchange2010Sp2,
    /// Exchange 2013.
    Exchange2013,
    /// Exchange 2013 Service Pack 1.
    Exchange2013Sp1,
}

impl ExchangeVersion {
    /// All known versions, oldest first.
    pub const ALL: [Self; 6] = [
        Self::Exchange2007Sp1,
        Self::Exchange2010,
        Self::Exchange2010Sp1,
        Self::Exchange2010Sp2,
        Self::Exchange2013,
        Self::Exchange2013Sp1,
    ];

    /// Returns the wire name written in `RequestServerVersion`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exchange2007Sp1 => "Exchange2007_SP1",
            Self::Exchange2010 => "Exchange2010",
            Self::Exchange2010Sp1 => "Exchange2010_SP1",
            Self::Exchange2010Sp2 => "Exchange2010_SP2",
            Self::Exchange2013 => "Exchange2013",
            Self::Exchange2013Sp1 => "Exchange2013_SP1",
        }
    }

    /// Returns `true` when a service speaking `self` can run a request that
    /// needs at least `minimum`.
    #[must_use]
    pub fn supports(self, minimum: Self) -> bool {
        self >= minimum
    }
}

impl fmt::Display for ExchangeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown version name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown protocol version '{name}'")]
pub struct ParseVersionError {
    name: String,
}

impl ParseVersionError {
    /// Returns the rejected name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for ExchangeVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|version| version.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseVersionError {
                name: trimmed.to_owned(),
            })
    }
}
