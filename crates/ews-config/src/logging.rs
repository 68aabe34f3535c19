//! Output formats for the client's tracing subscriber.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How log records are rendered on standard error.
///
/// Interactive use defaults to [`Compact`](Self::Compact). Services that ship
/// logs to a collector pick [`Json`](Self::Json), and
/// [`Pretty`](Self::Pretty) suits reading traced SOAP documents by eye.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One line per record.
    #[default]
    Compact,
    /// Multi-line records with fields and source locations.
    Pretty,
    /// One JSON object per record, fields flattened to the top level.
    Json,
}

impl LogFormat {
    /// Returns `true` when records are meant for a log collector rather than
    /// a terminal. Such output never carries ANSI colour codes.
    #[must_use]
    pub const fn is_machine_readable(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Error returned when text names no [`LogFormat`].
pub type LogFormatParseError = strum::ParseError;
