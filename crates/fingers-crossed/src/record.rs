//! crates/fingers-crossed/src/record.rs
//! Structured log records and their attributes.

use std::fmt;
use std::time::SystemTime;

use crate::level::Level;

/// Attribute value carried by a [`Record`] or attached to a derived sink.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// UTF-8 text.
    Str(String),
    /// Signed integer.
    I64(i64),
    /// Unsigned integer.
    U64(u64),
    /// Floating point number.
    F64(f64),
    /// Boolean flag.
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(value) => {
                // Quote text that would otherwise break key=value parsing.
                let ambiguous = value.is_empty()
                    || value.contains(|c: char| c.is_whitespace() || c == '=' || c == '"');
                if ambiguous {
                    write!(f, "{value:?}")
                } else {
                    f.write_str(value)
                }
            }
            Self::I64(value) => write!(f, "{value}"),
            Self::U64(value) => write!(f, "{value}"),
            Self::F64(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

macro_rules! value_from_int {
    ($variant:ident: $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )+
    };
}

value_from_int!(I64: i8, i16, i32, i64);
value_from_int!(U64: u8, u16, u32, u64);

/// A key/value pair attached to a record or baked into a derived sink.
#[derive(Clone, Debug, PartialEq)]
pub struct Attr {
    /// Attribute name, unqualified by any group.
    pub key: String,
    /// Attribute value.
    pub value: Value,
}

impl Attr {
    /// Creates an attribute from anything convertible into a [`Value`].
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A single log record as submitted by the caller.
///
/// Grouping context is not part of the record: it belongs to the sink the
/// record is emitted through, so the same record snapshot can be replayed
/// later against the sink that was current when it was submitted.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Severity of the record.
    pub level: Level,
    /// Human readable message.
    pub message: String,
    /// Time the record was created.
    pub timestamp: SystemTime,
    /// Attributes supplied with this record only.
    pub attrs: Vec<Attr>,
}

impl Record {
    /// Creates a record stamped with the current time and no attributes.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: SystemTime::now(),
            attrs: Vec::new(),
        }
    }

    /// Appends an attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.push(Attr::new(key, value));
        self
    }

    /// Replaces the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }
}
