//! crates/fingers-crossed/src/config.rs
//! Handler configuration.

use crate::level::{Level, ParseLevelError};

/// Configuration for a [`FingersCrossed`](crate::FingersCrossed) handler.
///
/// The threshold is the only option: the level at or above which buffered
/// records are released and buffering stops for good.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Release threshold. Defaults to [`Level::Error`].
    pub threshold: Level,
}

impl Config {
    /// Creates a configuration with the given threshold.
    #[must_use]
    pub const fn new(threshold: Level) -> Self {
        Self { threshold }
    }

    /// Creates a configuration from a textual level name such as `"warn"`.
    pub fn from_level_name(name: &str) -> Result<Self, ParseLevelError> {
        Ok(Self::new(name.parse()?))
    }
}
