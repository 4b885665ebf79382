//! crates/fingers-crossed/src/level.rs
//! Record severity levels and their textual form.

use std::fmt;
use std::str::FromStr;

/// Severity of a [`Record`](crate::Record), ordered from least to most severe.
///
/// The ordering drives every buffering decision: a record whose level is at or
/// above the handler threshold releases the buffer, and manual flushes keep
/// entries whose level is at or above the requested minimum.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Level {
    /// Very fine-grained tracing output.
    Trace,
    /// Diagnostic detail useful while debugging.
    Debug,
    /// Normal operational messages.
    Info,
    /// Something unexpected that the program recovered from.
    Warn,
    /// A failure. The default release threshold.
    #[default]
    Error,
}

impl Level {
    /// All levels in ascending order of severity.
    pub const ALL: [Self; 5] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
    ];

    /// Returns the upper-case name used when rendering records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {name:?} (expected trace, debug, info, warn or error)")]
pub struct ParseLevelError {
    name: String,
}

impl ParseLevelError {
    /// Returns the rejected input.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Parses a level name case-insensitively. `warning` is accepted as an
    /// alias for [`Level::Warn`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ParseLevelError { name: s.to_owned() }),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        // tracing orders its levels by verbosity, so map explicitly.
        match level {
            tracing::Level::TRACE => Self::Trace,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::ERROR => Self::Error,
        }
    }
}

impl From<&tracing::Level> for Level {
    fn from(level: &tracing::Level) -> Self {
        Self::from(*level)
    }
}
