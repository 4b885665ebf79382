//! crates/fingers-crossed/src/sink.rs
//! The downstream sink contract and the bundled sink implementations.

mod memory;
mod writer;

pub use memory::{CapturedRecord, MemorySink};
pub use writer::WriterSink;

use crate::error::SinkError;
use crate::level::Level;
use crate::record::{Attr, Record, Value};

/// Destination for log records.
///
/// A sink accepts records and can be derived into a new sink carrying extra
/// fixed attributes or an extra named group. Derivation never mutates the
/// receiver: the derived value behaves identically apart from the added
/// context. [`FingersCrossed`](crate::FingersCrossed) implements this trait
/// too, so handlers can wrap one another.
pub trait Sink: Send + Sync + 'static {
    /// Emits a single record.
    fn handle(&self, record: &Record) -> Result<(), SinkError>;

    /// Returns a sink that attaches `attrs` to every record it emits.
    #[must_use]
    fn with_attrs(&self, attrs: &[Attr]) -> Self
    where
        Self: Sized;

    /// Returns a sink that qualifies every subsequent attribute with `name`.
    #[must_use]
    fn with_group(&self, name: &str) -> Self
    where
        Self: Sized;

    /// Reports whether records at `level` are accepted.
    fn enabled(&self, level: Level) -> bool {
        let _ = level;
        true
    }
}

/// Accumulated attribute context shared by the bundled sinks.
///
/// Attributes baked in through [`Sink::with_attrs`] are stored already
/// qualified with the group path that was open when they were added, which is
/// how key=value text handlers lay out grouped output.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Scope {
    groups: Vec<String>,
    attrs: Vec<(String, Value)>,
}

impl Scope {
    pub(crate) fn with_attrs(&self, attrs: &[Attr]) -> Self {
        let mut scope = self.clone();
        scope
            .attrs
            .extend(attrs.iter().map(|attr| (self.qualify(&attr.key), attr.value.clone())));
        scope
    }

    pub(crate) fn with_group(&self, name: &str) -> Self {
        let mut scope = self.clone();
        if !name.is_empty() {
            scope.groups.push(name.to_owned());
        }
        scope
    }

    pub(crate) fn qualify(&self, key: &str) -> String {
        if self.groups.is_empty() {
            key.to_owned()
        } else {
            let mut qualified = self.groups.join(".");
            qualified.push('.');
            qualified.push_str(key);
            qualified
        }
    }

    /// Baked-in attributes followed by the record's own, all qualified.
    pub(crate) fn resolve(&self, record: &Record) -> Vec<(String, Value)> {
        let mut resolved = self.attrs.clone();
        resolved.extend(
            record
                .attrs
                .iter()
                .map(|attr| (self.qualify(&attr.key), attr.value.clone())),
        );
        resolved
    }
}
